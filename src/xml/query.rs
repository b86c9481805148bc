//! A small path language over [`Element`] trees.
//!
//! Supported forms: `.` (self), `TAG`, `A/B`, `.//TAG`, `A//B`, `*`, and
//! `prefix:TAG` where the prefix is resolved through a [`NamespaceMap`].

use super::loader::NamespaceMap;
use super::tree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    axis: Axis,
    test: String,
}

impl Step {
    /// Does `element` satisfy this step's name test?
    pub fn matches(&self, element: &Element, namespaces: &NamespaceMap) -> bool {
        if self.test == "*" {
            return true;
        }
        match self.test.split_once(':') {
            Some((prefix, local)) => {
                if element.local_name() != local {
                    return false;
                }
                match (namespaces.get(prefix), element.prefix().and_then(|p| namespaces.get(p))) {
                    (Some(wanted), Some(actual)) => wanted == actual,
                    _ => element.prefix() == Some(prefix),
                }
            }
            None => element.name == self.test,
        }
    }
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn parse(expr: &str) -> Self {
        let mut steps = Vec::new();
        let mut axis = Axis::Child;

        for (i, token) in expr.split('/').enumerate() {
            match token {
                "" if i > 0 => axis = Axis::Descendant,
                "" | "." => {}
                test => {
                    steps.push(Step {
                        axis,
                        test: test.to_string(),
                    });
                    axis = Axis::Child;
                }
            }
        }

        Self { steps }
    }

    /// The name test of the final step, used to match nodes while walking
    /// a tree mutably.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn evaluate<'a>(&self, node: &'a Element, namespaces: &NamespaceMap) -> Vec<&'a Element> {
        let mut current = vec![node];

        for step in &self.steps {
            let mut next = Vec::new();
            for el in current {
                match step.axis {
                    Axis::Child => next.extend(el.children.iter().filter(|c| step.matches(c, namespaces))),
                    Axis::Descendant => next.extend(
                        el.descendants()
                            .into_iter()
                            .filter(|d| step.matches(d, namespaces)),
                    ),
                }
            }
            current = next;
        }

        current
    }
}

/// Run `path` against `node`; return the first match, or `default` when
/// nothing matches.
pub fn query<'a>(
    node: &'a Element,
    path: &str,
    namespaces: &NamespaceMap,
    default: Option<&'a Element>,
) -> Option<&'a Element> {
    Path::parse(path)
        .evaluate(node, namespaces)
        .into_iter()
        .next()
        .or(default)
}

/// Every match of `path` in document order.
pub fn query_all<'a>(node: &'a Element, path: &str, namespaces: &NamespaceMap) -> Vec<&'a Element> {
    Path::parse(path).evaluate(node, namespaces)
}
