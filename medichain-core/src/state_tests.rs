use super::{GraphState, StateSchema, StateUpdate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
struct TriageState {
    urgency: u8,
    note: String,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
struct TriageUpdate {
    urgency: Option<u8>,
    note: Option<String>,
}

impl StateSchema for TriageState {
    type Update = TriageUpdate;

    fn apply(current: &Self, update: Self::Update) -> Self {
        Self {
            urgency: update.urgency.unwrap_or(current.urgency),
            note: update.note.unwrap_or_else(|| current.note.clone()),
        }
    }
}

#[test]
fn partial_update_keeps_untouched_fields() {
    let initial = TriageState {
        urgency: 1,
        note: "ho khan".to_string(),
    };

    let next = TriageState::apply(
        &initial,
        TriageUpdate {
            urgency: Some(3),
            note: None,
        },
    );

    assert_eq!(next.urgency, 3);
    assert_eq!(next.note, "ho khan");
}

#[test]
fn graph_state_apply_folds_update() {
    let state = GraphState::new(TriageState::default());
    let next = state.apply(StateUpdate::new(TriageUpdate {
        urgency: Some(2),
        note: Some("sot cao".to_string()),
    }));

    assert_eq!(
        next.into_inner(),
        TriageState {
            urgency: 2,
            note: "sot cao".to_string(),
        }
    );
}
