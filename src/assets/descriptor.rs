//! Unit Descriptor
//!
//! Read-only view of a unit XML file:
//!
//! ```xml
//! <unit>
//!   <model>
//!     <body material="Units/Marine" mesh="Units/Marine"
//!           idleAnimation="Units/MarineIdle" idleAnimationCount="3"/>
//!   </model>
//!   <weapons>
//!     <weapon>
//!       <model>
//!         <bolter material="Units/Bolter" mesh="Units/Bolter"
//!                 bone="Hand_R" animationSuffix="Bolter"/>
//!       </model>
//!     </weapon>
//!   </weapons>
//!   <actions>
//!     <attack>
//!       <model>
//!         <action animation="Units/MarineAttack" animationCount="2"/>
//!       </model>
//!     </attack>
//!   </actions>
//! </unit>
//! ```
//!
//! Attribute order is preserved, since clip names and registration order
//! follow it.

use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::errors::{ImportError, Result};

pub const UNIT_ROOT: &str = "unit";

/// Element attributes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn of(node: Node<'_, '_>) -> Self {
        Self(
            node.attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`Attributes::get`], treating an empty value as absent.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Attributes {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }
}

/// A tagged element with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tag: String,
    pub attributes: Attributes,
}

impl Record {
    fn of(node: Node<'_, '_>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            attributes: Attributes::of(node),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}

/// `actions/<category>/model`: the `action` records of one model block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionModel {
    pub actions: Vec<Record>,
}

/// `actions/<category>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCategory {
    pub tag: String,
    pub models: Vec<ActionModel>,
}

#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    pub path: PathBuf,
    /// Children of the first `model` element.
    pub models: Vec<Record>,
    /// `weapons/weapon/model/*`, flattened in document order.
    pub weapons: Vec<Record>,
    pub actions: Vec<ActionCategory>,
}

impl UnitDescriptor {
    /// Parses a unit document. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let document = Document::parse(text)?;
        let root = expect_root(&document, path, UNIT_ROOT)?;

        let model = child(root, "model").ok_or_else(|| ImportError::MissingElement {
            path: path.to_path_buf(),
            element: "model",
        })?;
        let models = elements(model).map(Record::of).collect();

        let weapons = children(root, "weapons")
            .flat_map(|weapons| children(weapons, "weapon"))
            .flat_map(|weapon| children(weapon, "model"))
            .flat_map(elements)
            .map(Record::of)
            .collect();

        let actions = children(root, "actions")
            .flat_map(elements)
            .map(|category| ActionCategory {
                tag: category.tag_name().name().to_string(),
                models: children(category, "model")
                    .map(|model| ActionModel {
                        actions: children(model, "action").map(Record::of).collect(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            models,
            weapons,
            actions,
        })
    }
}

// ============================================================================
// XML helpers
// ============================================================================

/// Returns the root element, or `UnexpectedRoot` if its tag is not `expected`.
pub(crate) fn expect_root<'a, 'input>(
    document: &'a Document<'input>,
    path: &Path,
    expected: &'static str,
) -> Result<Node<'a, 'input>> {
    let root = document.root_element();
    let found = root.tag_name().name();
    if found != expected {
        return Err(ImportError::UnexpectedRoot {
            path: path.to_path_buf(),
            expected,
            found: found.to_string(),
        });
    }
    Ok(root)
}

pub(crate) fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    elements(node).filter(move |n| n.tag_name().name() == tag)
}

pub(crate) fn child<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    children(node, tag).next()
}
