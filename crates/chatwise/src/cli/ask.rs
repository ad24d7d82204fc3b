use anyhow::Result;
use chatwise_core::{ReplySource, Resolution};

use crate::cli::dispatch;
use crate::cli::ux::{ChatMessageType, style_chat_text};
use crate::svc::chat::Chat;

/// Sends a single message and prints the reply.
pub async fn execute(message: Vec<String>, mut chat: Chat) -> Result<()> {
    let message = message.join(" ");
    let Some(resolution) = dispatch(&mut chat, &message).await else {
        return Ok(());
    };

    println!("{}", resolution.bot_turn.text());
    eprintln!(
        "{}",
        style_chat_text(&format_footer(&resolution), ChatMessageType::Footer)
    );
    Ok(())
}

fn format_footer(resolution: &Resolution) -> String {
    let source = match &resolution.source {
        ReplySource::Remote => "remote".to_string(),
        ReplySource::NotUnderstood => "not understood".to_string(),
        ReplySource::Local => "local".to_string(),
        ReplySource::Failed(e) => format!("failed: {e}"),
    };
    format!("{} · {}", resolution.bot_turn.id(), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatwise_core::config::{Config, Environment, WidgetConfig};
    use chatwise_core::responder::LocalResponder;
    use chatwise_core::{APOLOGY_TEXT, ReplyMode};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: &str, mode: ReplyMode) -> Config {
        Config {
            environment: Environment::Test,
            widget: WidgetConfig {
                endpoint: Url::parse(endpoint).unwrap(),
                credential: None,
                title: "ChatWise.ai".to_string(),
                mode,
            },
            responder: LocalResponder::default(),
        }
    }

    #[tokio::test]
    async fn test_footer_reports_reply_source() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Oi!"})))
            .mount(&server)
            .await;
        let mut chat = Chat::new(&test_config(&server.uri(), ReplyMode::Remote));

        let resolution = dispatch(&mut chat, "oi").await.unwrap();
        let footer = format_footer(&resolution);

        assert!(footer.ends_with("remote"));
        assert!(footer.starts_with(resolution.bot_turn.id().as_str()));
    }

    #[tokio::test]
    async fn test_footer_reports_failure() {
        let mut chat = Chat::new(&test_config("http://127.0.0.1:1/chat", ReplyMode::Remote));

        let resolution = dispatch(&mut chat, "oi").await.unwrap();

        assert_eq!(resolution.bot_turn.text(), APOLOGY_TEXT);
        assert!(format_footer(&resolution).contains("failed: HTTP request error"));
    }

    #[tokio::test]
    async fn test_execute_ignores_blank_message() {
        let chat = Chat::new(&test_config("http://127.0.0.1:1/chat", ReplyMode::Remote));
        execute(vec!["  ".to_string()], chat).await.unwrap();
    }
}
