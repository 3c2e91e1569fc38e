//! Boolean conditions over scene-graph blocks.
//!
//! Program files guard each program with a tree of conditions. A single
//! condition names a block type, optionally a value path inside it, and
//! compares that value against a literal:
//!
//! ```text
//! check NiTexturingProperty
//! check not NiAlphaProperty
//! check NiTexturingProperty/Apply Mode == 2
//! check NiMaterialProperty/Name != "glass"
//! check NiTriShapeData/Num Vertices >= 3
//! check NiTexturingProperty/Flags & 4096
//! ```
//!
//! Conditions are evaluated against the candidate blocks of a draw call:
//! the mesh, its data block and its active properties.

use crate::model::{NifValue, SceneModel};

/// Comparison between a block value and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    /// Bitwise AND test for counts.
    And,
    /// No comparison: true if the block is present.
    Present,
}

/// Comparator tokens as they appear in program files.
const COMPARATOR_TOKENS: [(Comparator, &str); 7] = [
    (Comparator::Eq, " == "),
    (Comparator::Ne, " != "),
    (Comparator::Le, " <= "),
    (Comparator::Ge, " >= "),
    (Comparator::Lt, " < "),
    (Comparator::Gt, " > "),
    (Comparator::And, " & "),
];

impl Comparator {
    /// The token for this comparator, `None` for [`Comparator::Present`].
    pub fn token(self) -> Option<&'static str> {
        COMPARATOR_TOKENS
            .iter()
            .find(|(comp, _)| *comp == self)
            .map(|(_, token)| *token)
    }

    fn compare<T: PartialOrd>(self, a: T, b: T, both: impl FnOnce(&T, &T) -> bool) -> bool {
        match self {
            Comparator::Eq => a == b,
            Comparator::Ne => a != b,
            Comparator::Le => a <= b,
            Comparator::Ge => a >= b,
            Comparator::Lt => a < b,
            Comparator::Gt => a > b,
            Comparator::And => both(&a, &b),
            Comparator::Present => true,
        }
    }
}

/// A condition tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Single(ConditionSingle),
    Group(ConditionGroup),
}

impl Condition {
    pub fn eval<M: SceneModel>(&self, model: &M, blocks: &[M::Index]) -> bool {
        match self {
            Condition::Single(single) => single.eval(model, blocks),
            Condition::Group(group) => group.eval(model, blocks),
        }
    }
}

impl From<ConditionSingle> for Condition {
    fn from(single: ConditionSingle) -> Self {
        Condition::Single(single)
    }
}

impl From<ConditionGroup> for Condition {
    fn from(group: ConditionGroup) -> Self {
        Condition::Group(group)
    }
}

/// Compare one block value against a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSingle {
    left: String,
    comparator: Comparator,
    right: String,
    invert: bool,
}

impl ConditionSingle {
    /// Parse a condition expression such as `NiMaterialProperty/Alpha < 1.0`.
    ///
    /// The line is split at the leftmost comparator token that does not
    /// start the line. One layer of double quotes around the right-hand side
    /// is removed. Without a comparator the whole line is the block path.
    pub fn parse(line: &str, invert: bool) -> Self {
        let found = COMPARATOR_TOKENS
            .iter()
            .filter_map(|(comp, token)| {
                line.find(*token)
                    .filter(|&pos| pos > 0)
                    .map(|pos| (pos, *comp, *token))
            })
            .min_by_key(|(pos, _, _)| *pos);

        match found {
            Some((pos, comparator, token)) => {
                let left = line[..pos].trim().to_string();
                let mut right = line[pos + token.len()..].trim();
                if right.len() >= 2 && right.starts_with('"') && right.ends_with('"') {
                    right = &right[1..right.len() - 1];
                }
                Self {
                    left,
                    comparator,
                    right: right.to_string(),
                    invert,
                }
            }
            None => Self {
                left: line.to_string(),
                comparator: Comparator::Present,
                right: String::new(),
                invert,
            },
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Find the index named by the left-hand path.
    ///
    /// The part before the first `/` is a block type; the first candidate
    /// block inheriting from it is used, and any remaining path is resolved
    /// inside that block.
    pub fn resolve<M: SceneModel>(&self, model: &M, blocks: &[M::Index]) -> Option<M::Index> {
        let (block_type, child) = match self.left.find('/') {
            Some(pos) if pos > 0 => (&self.left[..pos], &self.left[pos + 1..]),
            _ => (self.left.as_str(), ""),
        };

        let block = blocks
            .iter()
            .find(|block| model.inherits(*block, block_type))?;

        if child.is_empty() {
            Some(block.clone())
        } else {
            model.child(block, child)
        }
    }

    pub fn eval<M: SceneModel>(&self, model: &M, blocks: &[M::Index]) -> bool {
        let Some(index) = self.resolve(model, blocks) else {
            return self.invert;
        };

        if self.comparator == Comparator::Present {
            return !self.invert;
        }

        let comp = self.comparator;
        match model.value(&index) {
            NifValue::String(value) => {
                comp.compare(value.as_str(), self.right.as_str(), |a, b| {
                    !a.is_empty() && !b.is_empty()
                }) ^ self.invert
            }
            NifValue::Count(value) => {
                let right = self.right.parse::<u32>().unwrap_or(0);
                comp.compare(value, right, |a, b| a & b != 0) ^ self.invert
            }
            NifValue::Float(value) => {
                let right = self.right.parse::<f64>().unwrap_or(0.0) as f32;
                comp.compare(value, right, |a, b| *a != 0.0 && *b != 0.0) ^ self.invert
            }
            NifValue::Other => false,
        }
    }
}

/// An AND or OR combination of conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionGroup {
    conditions: Vec<Condition>,
    or: bool,
}

impl ConditionGroup {
    pub fn new(or: bool) -> Self {
        Self {
            conditions: Vec::new(),
            or,
        }
    }

    pub fn is_or_group(&self) -> bool {
        self.or
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn push(&mut self, condition: impl Into<Condition>) {
        self.conditions.push(condition.into());
    }

    /// Empty groups are true. Evaluation stops at the first child that
    /// decides the result.
    pub fn eval<M: SceneModel>(&self, model: &M, blocks: &[M::Index]) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        if self.or {
            self.conditions.iter().any(|c| c.eval(model, blocks))
        } else {
            self.conditions.iter().all(|c| c.eval(model, blocks))
        }
    }
}
