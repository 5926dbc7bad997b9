//! Placeholder templates for embedded text resources.
//!
//! A template is a `&'static str` baked in with `include_str!`, paired with
//! the variable set that fills its `__PLACEHOLDER__` markers.

use std::marker::PhantomData;

/// A set of values substituted into a template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded template bound to its variable type.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _vars: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _vars: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Substitute `__MARKER__` placeholders in one pass.
///
/// Values are inserted verbatim and never rescanned, so a value that happens
/// to contain another marker is left alone.
pub fn fill(content: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(content.len() + extra);
    let mut rest = content;

    while let Some(pos) = rest.find("__") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match vars.iter().find(|(marker, _)| tail.starts_with(marker)) {
            Some((marker, value)) => {
                out.push_str(value);
                rest = &tail[marker.len()..];
            }
            None => {
                out.push('_');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting<'a> {
        name: &'a str,
    }

    impl TemplateVars for Greeting<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__NAME__", self.name)])
        }
    }

    const HELLO: Template<Greeting<'static>> = Template::new("hello __NAME__, __NAME__!");

    #[test]
    fn test_render_replaces_every_marker() {
        let name = String::from("folio");
        assert_eq!(HELLO.render(&Greeting { name: &name }), "hello folio, folio!");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill("<p>__A__</p><i>__B__</i>", &[("__A__", "__B__"), ("__B__", "b")]);
        assert_eq!(out, "<p>__B__</p><i>b</i>");
    }

    #[test]
    fn test_fill_keeps_unknown_markers() {
        assert_eq!(fill("a__b__UNKNOWN__", &[("__b__", "x")]), "axUNKNOWN__");
    }
}
