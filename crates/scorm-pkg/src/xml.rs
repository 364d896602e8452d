//! DOM traversal helpers over `sxd-document`.
//!
//! Manifests come with a default namespace (`imscp`), prefixed extension
//! namespaces (`adlcp`, `lom`), or none at all. Every lookup here compares
//! local names only.

use sxd_document::dom::{ChildOfElement, Element, ParentOfChild};

/// Direct element children of `parent` named `name`, in document order.
pub(crate) fn children_named<'d>(parent: Element<'d>, name: &str) -> Vec<Element<'d>> {
    parent
        .children()
        .into_iter()
        .filter_map(|child| match child {
            ChildOfElement::Element(element) if element.name().local_part() == name => {
                Some(element)
            }
            _ => None,
        })
        .collect()
}

/// First direct element child of `parent` named `name`.
pub(crate) fn child_named<'d>(parent: Element<'d>, name: &str) -> Option<Element<'d>> {
    children_named(parent, name).into_iter().next()
}

/// First descendant of `parent` matching a child-combinator chain.
///
/// `&["lom", "general", "title", "string"]` behaves like the CSS selector
/// `lom > general > title > string` scoped to `parent`.
pub(crate) fn descendant_path<'d>(parent: Element<'d>, path: &[&str]) -> Option<Element<'d>> {
    if path.is_empty() {
        return None;
    }
    let mut stack: Vec<Element<'d>> = element_children(parent);
    stack.reverse();

    while let Some(element) = stack.pop() {
        if matches_chain(element, path) {
            return Some(element);
        }
        let mut children = element_children(element);
        children.reverse();
        stack.extend(children);
    }
    None
}

fn element_children(parent: Element<'_>) -> Vec<Element<'_>> {
    parent
        .children()
        .into_iter()
        .filter_map(|child| match child {
            ChildOfElement::Element(element) => Some(element),
            _ => None,
        })
        .collect()
}

fn matches_chain(element: Element<'_>, path: &[&str]) -> bool {
    let Some((last, init)) = path.split_last() else {
        return true;
    };
    if element.name().local_part() != *last {
        return false;
    }
    if init.is_empty() {
        return true;
    }
    match element.parent() {
        Some(ParentOfChild::Element(parent)) => matches_chain(parent, init),
        _ => false,
    }
}

/// Trimmed concatenation of all text below `element`.
pub(crate) fn text_content(element: Element<'_>) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text.trim().to_string()
}

fn collect_text(element: Element<'_>, out: &mut String) {
    for child in element.children() {
        match child {
            ChildOfElement::Text(text) => out.push_str(text.text()),
            ChildOfElement::Element(inner) => collect_text(inner, out),
            _ => {}
        }
    }
}

/// Text of the first descendant matching `path`, or `""`.
pub(crate) fn path_text(parent: Element<'_>, path: &[&str]) -> String {
    descendant_path(parent, path)
        .map(text_content)
        .unwrap_or_default()
}

/// Value of an attribute that carries no namespace.
pub(crate) fn attr<'d>(element: Element<'d>, name: &str) -> Option<&'d str> {
    element.attribute_value(name)
}

/// Value of a namespace-qualified attribute matched by local name,
/// e.g. `adlcp:scormType`.
pub(crate) fn namespaced_attr<'d>(element: Element<'d>, local_name: &str) -> Option<&'d str> {
    element
        .attributes()
        .into_iter()
        .find(|attribute| {
            let name = attribute.name();
            name.namespace_uri().is_some() && name.local_part() == local_name
        })
        .map(|attribute| attribute.value())
}
