//! Типы учебного контента и их фиксированные промпты.
//!
//! Each content type owns a system/user instruction pair, a heading for
//! text-only posts and the acknowledgement returned by the manual trigger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const WORDS_SYSTEM: &str = "Ти допомагаєш людині вивчати англійські слова. Дай 3 нових слова і вправи в стилі контекстного запамʼятовування.";
const WORDS_USER: &str = "Згенеруй сьогоднішнє задання на англійській із перекладом на українську, щоб було зрозуміло, як використовуються слова. Також додай emoji і все це повинно бути коротко і зрозуміло описано.";

const RULES_SYSTEM: &str = "Ти допомагаєш людині вивчати граматику англійської мови. Дай коротке, зрозуміле граматичне правило з прикладами.";
const RULES_USER: &str = "Згенеруй сьогоднішнє граматичне правило англійською мовою з перекладом на українську і прикладами. Додай emoji.";

const IDIOMS_SYSTEM: &str = "Ти допомагаєш людині вивчати англійські ідіоми. Дай 3 поширені ідіоми з поясненням значення і прикладами вживання.";
const IDIOMS_USER: &str = "Згенеруй сьогоднішню добірку англійських ідіом із перекладом на українську, поясненням і прикладом речення для кожної. Додай emoji і пиши коротко.";

/// Learning material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// New vocabulary with context exercises.
    #[serde(alias = "word")]
    Words,
    /// One grammar rule with examples.
    #[serde(alias = "rule")]
    Rules,
    /// A handful of idioms with usage.
    #[serde(alias = "idiom")]
    Idioms,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Words, ContentType::Rules, ContentType::Idioms];

    /// Tag used in logs, metrics and the illustration topic.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Words => "words",
            ContentType::Rules => "rules",
            ContentType::Idioms => "idioms",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            ContentType::Words => WORDS_SYSTEM,
            ContentType::Rules => RULES_SYSTEM,
            ContentType::Idioms => IDIOMS_SYSTEM,
        }
    }

    pub fn user_prompt(&self) -> &'static str {
        match self {
            ContentType::Words => WORDS_USER,
            ContentType::Rules => RULES_USER,
            ContentType::Idioms => IDIOMS_USER,
        }
    }

    /// Heading placed above text-only posts.
    pub fn text_heading(&self) -> &'static str {
        match self {
            ContentType::Words => "📚 Завдання на сьогодні",
            ContentType::Rules => "📘 Граматичне правило дня",
            ContentType::Idioms => "💬 Ідіоми дня",
        }
    }

    /// Body of a text-only post.
    pub fn text_message(&self, content: &str) -> String {
        format!("{}\n\n{}", self.text_heading(), content)
    }

    pub fn illustration_prompt(&self) -> String {
        format!(
            "An educational visual illustration for the topic: {}, minimal, emoji style",
            self.label()
        )
    }

    /// Fixed status returned by the manual trigger endpoint.
    pub fn manual_ack(&self) -> &'static str {
        match self {
            ContentType::Words => "Words sent manually",
            ContentType::Rules => "Rule sent manually",
            ContentType::Idioms => "Idioms sent manually",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "word" | "words" => Ok(ContentType::Words),
            "rule" | "rules" => Ok(ContentType::Rules),
            "idiom" | "idioms" => Ok(ContentType::Idioms),
            other => Err(Error::InvalidArgument(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ContentType::Words.label(), "words");
        assert_eq!(ContentType::Rules.label(), "rules");
        assert_eq!(ContentType::Idioms.label(), "idioms");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        for content_type in ContentType::ALL {
            assert!(!content_type.system_prompt().trim().is_empty());
            assert!(!content_type.user_prompt().trim().is_empty());
        }
    }

    #[test]
    fn test_text_message_prefixes_heading() {
        let body = ContentType::Words.text_message("Word: *ubiquitous*");
        assert_eq!(body, "📚 Завдання на сьогодні\n\nWord: *ubiquitous*");
    }

    #[test]
    fn test_illustration_prompt_mentions_label() {
        assert_eq!(
            ContentType::Idioms.illustration_prompt(),
            "An educational visual illustration for the topic: idioms, minimal, emoji style"
        );
    }

    #[test]
    fn test_manual_ack() {
        assert_eq!(ContentType::Words.manual_ack(), "Words sent manually");
        assert_eq!(ContentType::Rules.manual_ack(), "Rule sent manually");
        assert_eq!(ContentType::Idioms.manual_ack(), "Idioms sent manually");
    }

    #[test]
    fn test_from_str_accepts_singular_and_plural() {
        assert_eq!("word".parse::<ContentType>().unwrap(), ContentType::Words);
        assert_eq!("Rules".parse::<ContentType>().unwrap(), ContentType::Rules);
        assert_eq!(" idiom ".parse::<ContentType>().unwrap(), ContentType::Idioms);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "phrasal".parse::<ContentType>().unwrap_err();
        assert!(err.to_string().contains("Unknown content type: phrasal"));
    }

    #[test]
    fn test_deserialize_aliases() {
        let parsed: Vec<ContentType> = serde_yaml::from_str("[word, rules, idioms]").unwrap();
        assert_eq!(
            parsed,
            vec![ContentType::Words, ContentType::Rules, ContentType::Idioms]
        );
    }
}
