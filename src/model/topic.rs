use super::{Entity, Visit, now_timestamp, null_as_empty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,

    /// Most common language among the topic's repositories, empty when not listed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main_language: String,
}

impl Topic {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_language: String::new(),
        }
    }
}

impl Entity for Topic {
    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicVisit {
    pub name: String,
    visit_timestamp: i64,

    /// Number of repositories tagged with the topic, `-1` when the count never rendered.
    #[serde(default)]
    pub repositories: i64,

    #[serde(default)]
    pub followers: i64,
}

impl TopicVisit {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::captured_at(name, now_timestamp())
    }

    #[must_use]
    pub fn captured_at(name: impl Into<String>, visit_timestamp: i64) -> Self {
        Self {
            name: name.into(),
            visit_timestamp,
            repositories: 0,
            followers: 0,
        }
    }
}

impl Visit for TopicVisit {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn visit_timestamp(&self) -> i64 {
        self.visit_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_visit_round_trip_keeps_timestamp() {
        let mut visit = TopicVisit::captured_at("rust", 42);
        visit.followers = 1200;

        let json = serde_json::to_string(&visit).unwrap();
        let back: TopicVisit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, visit);
        assert_eq!(back.visit_timestamp(), 42);
    }

    #[test]
    fn test_topic_null_language() {
        let topic: Topic = serde_json::from_str(r#"{ "name": "mod", "main_language": null }"#).unwrap();
        assert_eq!(topic.main_language, "");
        assert_eq!(topic.key(), "mod");
    }
}
