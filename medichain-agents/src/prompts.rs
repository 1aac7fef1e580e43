//! Prompt text for the medical assistant persona.

use medichain_core::Document;

use crate::{HistoryEntry, HistoryRole};

/// Sentence every user-facing answer must end with.
pub const DISCLAIMER: &str = "Các thông tin mà chatbot cung cấp chỉ mang tính chất tham khảo. Hãy thật cẩn thận với các thông tin này.";

/// Answer used when every strategy failed.
pub const FALLBACK_RESPONSE: &str = "Tôi hiểu lo lắng của bạn về triệu chứng này. Để được tư vấn y tế chính xác, vui lòng tham khảo ý kiến chuyên gia y tế có thể đánh giá đúng tình trạng của bạn. Các thông tin mà chatbot cung cấp chỉ mang tính chất tham khảo. Hãy thật cẩn thận với các thông tin này.";

pub const MEDICAL_SYSTEM_PROMPT: &str = r#"Bạn là MedicalBot – chatbot cung cấp thông tin y tế và sức khỏe.
Hãy tuân thủ nghiêm các quy tắc sau:

## 1. Phạm vi
- Chỉ trả lời các câu hỏi liên quan đến y tế, sức khỏe, bệnh lý, triệu chứng, thuốc, dinh dưỡng, thói quen sống lành mạnh.
- Nếu câu hỏi không thuộc lĩnh vực y tế, hãy:
  + Trả lời ngắn gọn.
  + Sau đó thêm câu: "Tôi là chatbot chỉ trả lời các câu hỏi liên quan tới y tế, sức khỏe. Bạn hãy tập trung hỏi về y tế, sức khỏe nhé."

## 2. Cách trả lời câu hỏi y tế
- Trả lời ngắn gọn, rõ ràng, súc tích và đầy đủ ý.
- Không chẩn đoán thay bác sĩ.
- Không kê thuốc hoặc phác đồ điều trị chi tiết.
- Nếu câu hỏi nói về bệnh hoặc triệu chứng nguy hiểm, hãy bổ sung thêm: "Bạn nên đi khám tại cơ sở y tế càng sớm càng tốt để được kiểm tra trực tiếp."

## 3. Cảnh báo bắt buộc
Mọi câu trả lời (dù đúng chủ đề hay không) luôn phải kết thúc bằng câu:
"Các thông tin mà chatbot cung cấp chỉ mang tính chất tham khảo. Hãy thật cẩn thận với các thông tin này."

## 4. Quy tắc an toàn
- Không đưa thông tin phản khoa học.
- Không đảm bảo thông tin 100%.
- Nếu nội dung có thể gây hại, phải khuyến cáo người dùng đi khám.
- Giữ giọng điệu thân thiện, tôn trọng."#;

/// Passages per prompt and characters kept from each.
pub const MAX_CONTEXT_DOCUMENTS: usize = 3;
pub const MAX_DOCUMENT_CHARS: usize = 1000;

/// One line per entry: `Người dùng: ...` or `MedicalBot: ...`.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let speaker = match entry.role {
            HistoryRole::User => "Người dùng",
            HistoryRole::Assistant => "MedicalBot",
        };
        out.push_str(speaker);
        out.push_str(": ");
        out.push_str(&entry.content);
        out.push('\n');
    }
    out
}

/// First three documents, each cut to 1000 characters, separated by blank lines.
pub fn format_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .take(MAX_CONTEXT_DOCUMENTS)
        .map(|doc| doc.truncated_content(MAX_DOCUMENT_CHARS))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn llm_prompt(history: &str, question: &str) -> String {
    format!(
        "{MEDICAL_SYSTEM_PROMPT}\n\n---\n\nLịch sử hội thoại:\n{history}\n\nCâu hỏi hiện tại của người dùng:\n{question}\n\nHãy trả lời theo đúng các quy tắc trên."
    )
}

pub fn rag_prompt(history: &str, question: &str, medical_content: &str) -> String {
    format!(
        "{MEDICAL_SYSTEM_PROMPT}\n\n---\n\nLịch sử hội thoại:\n{history}\n\nCâu hỏi hiện tại của người dùng:\n{question}\n\nThông tin y tế tham khảo:\n{medical_content}\n\nHãy trả lời dựa trên thông tin y tế được cung cấp, tuân thủ đúng các quy tắc trên."
    )
}

/// `answer` with the disclaimer appended on a new paragraph unless it already contains it.
pub fn with_disclaimer(answer: &str) -> String {
    if answer.contains(DISCLAIMER) {
        answer.to_string()
    } else {
        format!("{}\n\n{DISCLAIMER}", answer.trim_end())
    }
}
