//! Prompt templates with named `{placeholder}` substitution.
//!
//! Rendering is literal replacement: no escaping, no conditionals. A template
//! only renders when handed exactly the variables it declares.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

pub const TITLE_TEMPLATE: &str = "Write me a YouTube video title about {topic}";

pub const SCRIPT_TEMPLATE: &str = "Write me a YouTube video script based on this title TITLE: {title} but also while leveraging this wikipedia research: {wikipedia_research}";

/// Variable name → value mapping handed to [`PromptTemplate::render`]
pub type Variables = HashMap<String, String>;

/// Build a [`Variables`] map from `(name, value)` pairs
pub fn variables<I, K, V>(pairs: I) -> Variables
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },

    #[error("Variable `{0}` is declared more than once")]
    DuplicateVariable(String),

    #[error("Template declares {declared:?} but its text uses {used:?}")]
    DeclarationMismatch {
        declared: Vec<String>,
        used: Vec<String>,
    },

    #[error("Variables do not match template: missing {missing:?}, unexpected {unexpected:?}")]
    VariableMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    input_variables: Vec<String>,
    template: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `template` and check its placeholders against `input_variables`
    pub fn new<I, S>(input_variables: I, template: impl Into<String>) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = template.into();
        let input_variables: Vec<String> = input_variables.into_iter().map(Into::into).collect();

        let mut declared = BTreeSet::new();
        for name in &input_variables {
            if !declared.insert(name.clone()) {
                return Err(TemplateError::DuplicateVariable(name.clone()));
            }
        }

        let segments = parse(&template)?;
        let used: BTreeSet<String> = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect();

        if used != declared {
            return Err(TemplateError::DeclarationMismatch {
                declared: declared.into_iter().collect(),
                used: used.into_iter().collect(),
            });
        }

        Ok(Self {
            input_variables,
            template,
            segments,
        })
    }

    pub fn title() -> Result<Self, TemplateError> {
        Self::new(["topic"], TITLE_TEMPLATE)
    }

    pub fn script() -> Result<Self, TemplateError> {
        Self::new(["title", "wikipedia_research"], SCRIPT_TEMPLATE)
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute every placeholder; the key set must equal the declared variables
    pub fn render(&self, variables: &Variables) -> Result<String, TemplateError> {
        let missing: Vec<String> = self
            .input_variables
            .iter()
            .filter(|name| !variables.contains_key(name.as_str()))
            .cloned()
            .collect();
        let mut unexpected: Vec<String> = variables
            .keys()
            .filter(|key| !self.input_variables.contains(key))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            unexpected.sort();
            return Err(TemplateError::VariableMismatch { missing, unexpected });
        }

        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                // presence checked above
                Segment::Variable(name) => {
                    if let Some(value) = variables.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        Ok(out)
    }
}

fn parse(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if c == '{' {
                        return Err(TemplateError::Malformed {
                            position,
                            reason: "nested `{` inside placeholder",
                        });
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::Malformed {
                        position,
                        reason: "unclosed placeholder",
                    });
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::Malformed {
                        position,
                        reason: "empty placeholder",
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => {
                return Err(TemplateError::Malformed {
                    position,
                    reason: "unmatched `}`",
                });
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_template_renders_topic() {
        let template = PromptTemplate::title().unwrap();
        let rendered = template.render(&variables([("topic", "bees")])).unwrap();
        assert_eq!(rendered, "Write me a YouTube video title about bees");
    }

    #[test]
    fn test_script_template_renders_both_variables() {
        let template = PromptTemplate::script().unwrap();
        let rendered = template
            .render(&variables([
                ("title", "Volcano Mysteries"),
                ("wikipedia_research", "Volcanoes are..."),
            ]))
            .unwrap();
        assert_eq!(
            rendered,
            "Write me a YouTube video script based on this title TITLE: Volcano Mysteries \
             but also while leveraging this wikipedia research: Volcanoes are..."
        );
    }

    #[test]
    fn test_missing_variable_rejected() {
        for template in [PromptTemplate::title().unwrap(), PromptTemplate::script().unwrap()] {
            let err = template.render(&Variables::new()).unwrap_err();
            match err {
                TemplateError::VariableMismatch { missing, unexpected } => {
                    assert_eq!(missing, template.input_variables());
                    assert!(unexpected.is_empty());
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_extra_variable_rejected() {
        let title = PromptTemplate::title().unwrap();
        let err = title
            .render(&variables([("topic", "bees"), ("mood", "calm")]))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::VariableMismatch {
                missing: vec![],
                unexpected: vec!["mood".to_string()],
            }
        );

        let script = PromptTemplate::script().unwrap();
        let err = script
            .render(&variables([
                ("title", "t"),
                ("wikipedia_research", "r"),
                ("topic", "x"),
            ]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::VariableMismatch { .. }));
    }

    #[test]
    fn test_values_are_inserted_literally() {
        let template = PromptTemplate::title().unwrap();
        let rendered = template
            .render(&variables([("topic", "{title} & <b>")]))
            .unwrap();
        assert_eq!(rendered, "Write me a YouTube video title about {title} & <b>");
    }

    #[test]
    fn test_escaped_braces() {
        let template = PromptTemplate::new(["x"], "{{literal}} {x}").unwrap();
        assert_eq!(template.render(&variables([("x", "1")])).unwrap(), "{literal} 1");
    }

    #[test]
    fn test_declaration_must_match_text() {
        let err = PromptTemplate::new(["topic", "unused"], "About {topic}").unwrap_err();
        assert!(matches!(err, TemplateError::DeclarationMismatch { .. }));

        let err = PromptTemplate::new(Vec::<String>::new(), "About {topic}").unwrap_err();
        assert!(matches!(err, TemplateError::DeclarationMismatch { .. }));
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(
            PromptTemplate::new(["a"], "{a").unwrap_err(),
            TemplateError::Malformed { .. }
        ));
        assert!(matches!(
            PromptTemplate::new(Vec::<String>::new(), "oops }").unwrap_err(),
            TemplateError::Malformed { .. }
        ));
        assert!(matches!(
            PromptTemplate::new(Vec::<String>::new(), "{}").unwrap_err(),
            TemplateError::Malformed { .. }
        ));
    }

    #[test]
    fn test_duplicate_declaration() {
        let err = PromptTemplate::new(["a", "a"], "{a}").unwrap_err();
        assert_eq!(err, TemplateError::DuplicateVariable("a".to_string()));
    }
}
