// SPDX-License-Identifier: MIT

//! Role inference (§4.8.1): decides `user` vs `assistant` for a finalized
//! message whose metadata never reported a role.

use std::sync::OnceLock;

use clankers_core::Role;
use regex::Regex;

fn assistant_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(i'll|let me|here's|i can|i've|i'm going to|i will|sure|certainly|of course)\b",
        )
        .unwrap_or_else(|e| unreachable!("static pattern is valid regex: {e}"))
    })
}

fn user_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(create|fix|add|update|show|make|build|implement|write|delete|remove|change|modify|help|can you|please|i want|i need)\b",
        )
        .unwrap_or_else(|e| unreachable!("static pattern is valid regex: {e}"))
    })
}

fn yes_no_pronoun() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(yes|no),\s*(i|you|it|we|they|he|she)\b")
            .unwrap_or_else(|e| unreachable!("static pattern is valid regex: {e}"))
    })
}

fn bold_numbered_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\d+\.\s*\*\*").unwrap_or_else(|e| unreachable!("static pattern is valid regex: {e}"))
    })
}

pub fn infer(text: &str) -> Role {
    let trimmed = text.trim();

    if assistant_opener().is_match(trimmed)
        || trimmed.contains("```")
        || yes_no_pronoun().is_match(trimmed)
        || trimmed.contains("**")
        || bold_numbered_item().is_match(trimmed)
    {
        return Role::Assistant;
    }

    if trimmed.ends_with('?') || user_opener().is_match(trimmed) || trimmed.starts_with('@') {
        return Role::User;
    }

    if trimmed.chars().count() > 500 {
        Role::Assistant
    } else {
        Role::User
    }
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
