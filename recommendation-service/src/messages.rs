//! Caller-visible error messages.
//!
//! The `error` field of an error payload is a stable English code; only the
//! human-readable `message` follows the configured locale.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Japanese,
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    MethodNotAllowed,
    MissingAnswers,
    MalformedBody,
    NonTextAnswer,
    Misconfigured,
    AuthenticationFailed,
    GenerationFailed,
}

impl Locale {
    /// Language the model is asked to write its reasons in.
    pub fn reply_language(&self) -> &'static str {
        match self {
            Locale::Japanese => "Japanese",
            Locale::English => "English",
        }
    }

    pub fn text(&self, message: Message) -> &'static str {
        match (self, message) {
            (Locale::Japanese, Message::MethodNotAllowed) => "許可されていないメソッドです",
            (Locale::Japanese, Message::MissingAnswers) => "質問への回答が含まれていません",
            (Locale::Japanese, Message::MalformedBody) => "リクエストの形式が正しくありません",
            (Locale::Japanese, Message::NonTextAnswer) => "回答は文字列で指定してください",
            (Locale::Japanese, Message::Misconfigured) => {
                "サーバーの設定に問題があります。管理者に連絡してください。"
            }
            (Locale::Japanese, Message::AuthenticationFailed) => {
                "AWS認証に失敗しました。管理者に連絡してください。"
            }
            (Locale::Japanese, Message::GenerationFailed) => {
                "レコメンデーションの取得中にエラーが発生しました"
            }

            (Locale::English, Message::MethodNotAllowed) => "This method is not allowed",
            (Locale::English, Message::MissingAnswers) => {
                "The request does not contain any questionnaire answers"
            }
            (Locale::English, Message::MalformedBody) => {
                "The request body must be a JSON object of answers"
            }
            (Locale::English, Message::NonTextAnswer) => "Every answer must be a string",
            (Locale::English, Message::Misconfigured) => {
                "The server is misconfigured. Please contact the administrator."
            }
            (Locale::English, Message::AuthenticationFailed) => {
                "Authentication with the model provider failed. Please contact the administrator."
            }
            (Locale::English, Message::GenerationFailed) => {
                "An error occurred while generating recommendations"
            }
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" | "japanese" => Ok(Locale::Japanese),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale `{other}` (expected ja or en)")),
        }
    }
}
