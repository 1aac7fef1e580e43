//! Terminal chat loop. `exit` quits, `clear` starts a new conversation.

use anyhow::Result;
use medichain_agents::prompts::with_disclaimer;
use medichain_agents::{AgentState, MedicalWorkflow};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    Clear,
    Empty,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("exit") {
        Input::Exit
    } else if line.eq_ignore_ascii_case("clear") {
        Input::Clear
    } else if line.is_empty() {
        Input::Empty
    } else {
        Input::Question(line)
    }
}

pub async fn run(workflow: MedicalWorkflow) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = dirs::data_dir().map(|dir| dir.join("medichain").join("history.txt"));
    if let Some(path) = &history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.load_history(path);
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Medical AI Assistant Ready!");
    println!("{}", "=".repeat(60));
    println!("Lệnh: 'exit' để thoát, 'clear' để xoá hội thoại");
    println!("Hãy đặt câu hỏi về y tế, sức khỏe\n");

    let mut state = AgentState::new();
    loop {
        let line = match rl.readline("Your question: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        };

        match classify(&line) {
            Input::Exit => break,
            Input::Clear => {
                state = AgentState::new();
                println!("\nĐã xoá hội thoại. Bắt đầu lại!\n");
            }
            Input::Empty => println!("Vui lòng nhập câu hỏi.\n"),
            Input::Question(question) => {
                let _ = rl.add_history_entry(question);
                println!("\nĐang xử lý câu hỏi...");
                match workflow.run_turn(state.clone(), question).await {
                    Ok(next) => {
                        let answer = next.generation.as_deref().unwrap_or_default();
                        println!("\nResponse: {}", with_disclaimer(answer));
                        println!("Source: {}", next.source);
                        state = next;
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "turn failed");
                        println!("\nKhông thể tạo câu trả lời. Vui lòng thử lại.");
                    }
                }
                println!("\n{}\n", "-".repeat(60));
            }
        }
    }

    println!("\nCảm ơn bạn đã sử dụng Medical AI Assistant. Chúc bạn nhiều sức khỏe!");
    if let Some(path) = &history_path {
        let _ = rl.save_history(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(classify("  EXIT "), Input::Exit);
        assert_eq!(classify("Clear"), Input::Clear);
        assert_eq!(classify("   "), Input::Empty);
        assert_eq!(classify(" đau đầu "), Input::Question("đau đầu"));
    }
}
