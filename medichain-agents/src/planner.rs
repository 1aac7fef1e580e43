//! Keyword scoring that decides whether a question should start with the
//! local medical corpus or with the model's own knowledge.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use medichain_core::MedichainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::Route;

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern compiles"));

/// Lowercase and strip Vietnamese diacritics: `"Đau Đầu"` becomes `"dau dau"`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'đ' { 'd' } else { c })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Disease,
    Symptom,
    MedicalTerm,
    BodyPart,
    Generic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerWeights {
    pub disease: f64,
    pub symptom: f64,
    pub medical_term: f64,
    pub body_part: f64,
    pub generic: f64,
}

impl Default for PlannerWeights {
    fn default() -> Self {
        Self {
            disease: 3.0,
            symptom: 2.0,
            medical_term: 2.0,
            body_part: 1.0,
            generic: 0.5,
        }
    }
}

impl PlannerWeights {
    fn for_category(&self, category: KeywordCategory) -> f64 {
        match category {
            KeywordCategory::Disease => self.disease,
            KeywordCategory::Symptom => self.symptom,
            KeywordCategory::MedicalTerm => self.medical_term,
            KeywordCategory::BodyPart => self.body_part,
            KeywordCategory::Generic => self.generic,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| word.to_string()).collect()
}

/// Keyword taxonomy, weights and routing threshold. Missing fields in a JSON
/// config fall back to the built-in English and Vietnamese taxonomy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub threshold: f64,
    pub weights: PlannerWeights,
    pub symptoms: Vec<String>,
    pub diseases: Vec<String>,
    pub medical_terms: Vec<String>,
    pub body_parts: Vec<String>,
    pub generic: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            threshold: 2.5,
            weights: PlannerWeights::default(),
            symptoms: words(&[
                "fever", "pain", "headache", "nausea", "vomiting", "diarrhea", "cough",
                "shortness of breath", "chest pain", "dizziness", "fatigue", "seizure",
                "bleeding", "weight loss", "insomnia",
                "sot", "dau", "dau dau", "buon non", "non", "tieu chay", "ho", "kho tho",
                "dau nguc", "chong mat", "met moi", "co giat", "chay mau", "sut can",
                "mat ngu",
            ]),
            diseases: words(&[
                "cancer", "diabetes", "hypertension", "heart disease", "stroke", "asthma",
                "copd", "pneumonia", "covid", "epilepsy",
                "ung thu", "tieu duong", "cao huyet ap", "benh tim", "dot quy", "hen suyen",
                "viem phoi", "dong kinh",
            ]),
            medical_terms: words(&[
                "diagnosis", "treatment", "medication", "surgery", "prescription",
                "side effects", "vaccine", "rehabilitation",
                "chan doan", "dieu tri", "thuoc", "phau thuat", "tac dung phu", "vac xin",
                "phuc hoi",
            ]),
            body_parts: words(&[
                "heart", "lung", "brain", "liver", "kidney",
                "tim", "phoi", "nao", "gan", "than",
            ]),
            generic: words(&["benh", "suc khoe", "y te", "kham", "bac si", "benh vien"]),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MedichainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MedichainError::InvalidConfig(format!("{}: {err}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeywordMatch {
    pub keyword: String,
    pub category: KeywordCategory,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanScore {
    pub score: f64,
    pub matches: Vec<KeywordMatch>,
    pub route: Route,
}

#[derive(Clone, Debug)]
struct KeywordSet {
    category: KeywordCategory,
    words: HashSet<String>,
    phrases: Vec<String>,
}

impl KeywordSet {
    fn new(category: KeywordCategory, keywords: &[String]) -> Self {
        let mut words = HashSet::new();
        let mut phrases = BTreeSet::new();
        for keyword in keywords {
            let keyword = normalize(keyword.trim());
            if keyword.is_empty() {
                continue;
            }
            if keyword.contains(' ') {
                phrases.insert(keyword.clone());
            }
            words.insert(keyword);
        }
        Self {
            category,
            words,
            phrases: phrases.into_iter().collect(),
        }
    }
}

/// Deterministic question scorer.
///
/// Multi-word phrases of the symptom, disease and medical-term sets are
/// matched as substrings of the normalized question. Then each distinct word
/// token scores once, in the first set that contains it, checked in the order
/// disease, symptom, medical term, body part, generic.
#[derive(Clone, Debug)]
pub struct Planner {
    threshold: f64,
    weights: PlannerWeights,
    // Token lookup order.
    sets: Vec<KeywordSet>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let sets = vec![
            KeywordSet::new(KeywordCategory::Disease, &config.diseases),
            KeywordSet::new(KeywordCategory::Symptom, &config.symptoms),
            KeywordSet::new(KeywordCategory::MedicalTerm, &config.medical_terms),
            KeywordSet::new(KeywordCategory::BodyPart, &config.body_parts),
            KeywordSet::new(KeywordCategory::Generic, &config.generic),
        ];
        Self {
            threshold: config.threshold,
            weights: config.weights,
            sets,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, question: &str) -> PlanScore {
        let normalized = normalize(question);
        let mut score = 0.0f64;
        let mut matches = Vec::new();

        for category in [
            KeywordCategory::Symptom,
            KeywordCategory::Disease,
            KeywordCategory::MedicalTerm,
        ] {
            let Some(set) = self.sets.iter().find(|set| set.category == category) else {
                continue;
            };
            for phrase in set.phrases.iter().filter(|p| normalized.contains(p.as_str())) {
                score += self.weights.for_category(category);
                matches.push(KeywordMatch {
                    keyword: phrase.clone(),
                    category,
                });
            }
        }

        let tokens: BTreeSet<&str> = WORD_REGEX
            .find_iter(&normalized)
            .map(|token| token.as_str())
            .collect();
        for token in tokens {
            if let Some(set) = self.sets.iter().find(|set| set.words.contains(token)) {
                score += self.weights.for_category(set.category);
                matches.push(KeywordMatch {
                    keyword: token.to_string(),
                    category: set.category,
                });
            }
        }

        let route = if score >= self.threshold {
            Route::Retriever
        } else {
            Route::LlmAgent
        };
        PlanScore {
            score,
            matches,
            route,
        }
    }

    pub fn route(&self, question: &str) -> Route {
        self.score(question).route
    }
}
