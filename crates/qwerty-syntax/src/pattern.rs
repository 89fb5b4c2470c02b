//! The pattern table: one matcher per lexical rule, compiled from a
//! [`Language`].
//!
//! Matchers only find raw candidates. Precedence, string protection and
//! vocabulary exclusion are applied by the [`LineClassifier`](crate::LineClassifier).

use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

use crate::{Category, Language, SyntaxError};

/// Rules evaluated after strings, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Keyword,
    Number,
    Definition,
    /// A word followed by a single `=`
    Assignment,
    BuiltIn,
    /// A word followed by `(`
    CallSite,
    SelfReference,
}

impl Rule {
    /// Evaluation order. A candidate never paints over text already claimed
    /// by an earlier rule.
    pub const ORDER: [Rule; 7] = [
        Rule::Keyword,
        Rule::Number,
        Rule::Definition,
        Rule::Assignment,
        Rule::BuiltIn,
        Rule::CallSite,
        Rule::SelfReference,
    ];

    pub fn category(self) -> Category {
        match self {
            Rule::Keyword => Category::Keyword,
            Rule::Number => Category::Number,
            Rule::Definition => Category::Definition,
            Rule::BuiltIn => Category::BuiltIn,
            Rule::Assignment | Rule::CallSite => Category::Identifier,
            Rule::SelfReference => Category::SelfReference,
        }
    }

    /// Identifier rules are subject to vocabulary exclusion.
    pub fn is_identifier(self) -> bool {
        matches!(self, Rule::Assignment | Rule::CallSite)
    }
}

/// Compiled matchers and frozen vocabularies for one language.
#[derive(Debug, Clone)]
pub struct PatternTable {
    language: Language,
    comment: Regex,
    string: Regex,
    keyword: Regex,
    number: Regex,
    definition: Regex,
    builtin: Regex,
    word: Regex,
    self_reference: Regex,
    keywords: HashSet<&'static str>,
    builtins: HashSet<&'static str>,
}

impl PatternTable {
    pub fn new(language: Language) -> Result<Self, SyntaxError> {
        let comment = Regex::new(&format!("{}.*", regex::escape(language.comment)))?;

        // Triple-quoted strings must close on the same line; single-quoted runs
        // stop at the first unescaped matching quote.
        let string = Regex::new(
            r#""""(?:.*?)"""|'''(?:.*?)'''|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#,
        )?;

        let number = Regex::new(
            r"\b[0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?\b|\b0[xX][0-9A-Fa-f]+\b|\b0[bB][01]+\b",
        )?;

        let definition = Regex::new(&format!(
            r"\b(?:{})\s+(\w+)",
            alternation(language.definition_introducers)
        ))?;

        Ok(Self {
            language,
            comment,
            string,
            keyword: Regex::new(&format!(r"\b(?:{})\b", alternation(language.keywords)))?,
            number,
            definition,
            builtin: Regex::new(&format!(r"\b(?:{})\b", alternation(language.builtins)))?,
            word: Regex::new(r"\w+")?,
            self_reference: Regex::new(&format!(r"\b{}\b", regex::escape(language.self_token)))?,
            keywords: language.keywords.iter().copied().collect(),
            builtins: language.builtins.iter().copied().collect(),
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Byte offset of the comment introducer, if the line has one.
    pub fn comment_start(&self, line: &str) -> Option<usize> {
        self.comment.find(line).map(|m| m.start())
    }

    /// All complete string literals on the line.
    pub fn strings(&self, line: &str) -> Vec<Range<usize>> {
        self.string.find_iter(line).map(|m| m.range()).collect()
    }

    /// Raw candidates for one rule, left to right.
    pub fn candidates(&self, rule: Rule, line: &str) -> Vec<Range<usize>> {
        match rule {
            Rule::Keyword => find_all(&self.keyword, line),
            Rule::Number => find_all(&self.number, line),
            Rule::BuiltIn => find_all(&self.builtin, line),
            Rule::SelfReference => find_all(&self.self_reference, line),
            Rule::Definition => self
                .definition
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .map(|name| name.range())
                .collect(),
            Rule::Assignment => self.identifiers(line, is_single_assignment),
            Rule::CallSite => self.identifiers(line, is_call),
        }
    }

    /// Whole words not starting with a digit whose trailing text satisfies
    /// `followed_by`.
    fn identifiers(&self, line: &str, followed_by: fn(&str) -> bool) -> Vec<Range<usize>> {
        self.word
            .find_iter(line)
            .filter(|m| !m.as_str().starts_with(|c: char| c.is_ascii_digit()))
            .filter(|m| followed_by(&line[m.end()..]))
            .map(|m| m.range())
            .collect()
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_builtin(&self, word: &str) -> bool {
        self.builtins.contains(word)
    }
}

fn find_all(regex: &Regex, line: &str) -> Vec<Range<usize>> {
    regex.find_iter(line).map(|m| m.range()).collect()
}

/// Escaped alternation, longest words first.
fn alternation(words: &[&str]) -> String {
    let mut words: Vec<&str> = words.to_vec();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// `\s*=` followed by any character other than `=`.
fn is_single_assignment(rest: &str) -> bool {
    let mut chars = rest.trim_start().chars();
    chars.next() == Some('=') && chars.next().is_some_and(|c| c != '=')
}

/// `\s*\(`
fn is_call(rest: &str) -> bool {
    rest.trim_start().starts_with('(')
}
