use crate::cli::ux::{format_banner, format_turn};
use crate::svc::chat::Chat;
use anyhow::Result;

mod repl;

/// Executes the chat command, starting an interactive REPL session.
pub async fn execute(mut chat: Chat) -> Result<()> {
    println!(
        "{}",
        format_banner(chat.title(), chat.mode(), chat.endpoint().as_str())
    );

    let bot_label = chat.title().to_string();
    chat.subscribe(Box::new(move |turn| {
        println!("\n{}", format_turn(turn, &bot_label));
    }));

    repl::run(&mut chat).await
}
