//! Prompt building
//!
//! Fixed instruction templates for the three generation calls the pipeline
//! makes: query rewriting, grounded answer synthesis, and the simplified
//! last-resort answer. Answers are sent to a chat surface, so every
//! template forbids markdown.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Rewrite instruction: expand abbreviations, add synonyms, normalize
/// colloquialisms. One line out.
pub fn rewrite_prompt(question: &str) -> Vec<Message> {
    let content = format!(
        "以下の質問を検索に適した形にリライトしてください：\n\
         - 略語を展開（例：「利単」→「利用単位」）\n\
         - 同義語を追加\n\
         - 口語的表現を標準化\n\n\
         質問：{question}\n\n\
         リライト結果（1行で）："
    );
    vec![Message::user(content)]
}

/// Answer instruction: strictly from the supplied documents, no
/// speculation, plain text only.
pub fn answer_prompt(documents: &str, question: &str) -> Vec<Message> {
    let content = format!(
        "以下のドキュメントに基づいて質問に答えてください。\n\
         推測は一切せず、ドキュメントに書かれている内容のみで回答してください。\n\
         チャットアプリへ返信するので、マークダウン記法ではなく、文章のみで返答してください。\n\n\
         ドキュメント：\n{documents}\n\n\
         質問：{question}\n\n\
         回答："
    );
    vec![Message::user(content)]
}

/// Simplified instruction for the last-resort error path
pub fn simple_answer_prompt(documents: &str, question: &str) -> Vec<Message> {
    let content = format!(
        "あなたはドキュメントに基づいて質問に答えるアシスタントです。\
         以下のドキュメントに基づいて質問に答えてください。\n\
         推測での回答は避けてください。\
         チャットアプリへ返信するので、マークダウン記法ではなく、文章のみで返答してください。\n\n\
         ドキュメント：\n{documents}\n\n\
         質問：{question}\n\n\
         答え："
    );
    vec![Message::user(content)]
}
