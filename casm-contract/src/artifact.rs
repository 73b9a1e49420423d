use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use casm_ir::felt;
use num_bigint::BigUint;
use serde::Deserialize;

use crate::error::{Error, Result};

/// The compiled program object of a contract artifact.
///
/// Compiled StarkNet contracts wrap this under a `program` key; bare
/// compiled programs are the object itself. Both forms are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramJson {
    /// Field prime, as a hex or decimal string.
    pub prime: String,
    /// Machine words, as hex field-element strings.
    pub data: Vec<String>,
    #[serde(default)]
    pub builtins: Vec<String>,
    /// Hints keyed by the stringified pc they precede.
    #[serde(default)]
    pub hints: BTreeMap<String, Vec<Hint>>,
    /// Named program entities, keyed by dotted path.
    #[serde(default)]
    pub identifiers: BTreeMap<String, Identifier>,
}

/// One hint entry attached to a pc.
#[derive(Debug, Clone, Deserialize)]
pub struct Hint {
    pub code: String,
}

/// An entry of the artifact's identifier table.
#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pc: Option<u64>,
    #[serde(default)]
    pub decorators: Option<Vec<String>>,
    #[serde(default)]
    pub members: Option<BTreeMap<String, Member>>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A member of a struct identifier (argument/return lists are structs whose
/// member offsets give the declaration order).
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub cairo_type: Option<String>,
}

/// A function declaration found in the identifier table.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub pc: u64,
    pub decorators: Vec<String>,
}

impl ProgramJson {
    /// Load a contract artifact or bare program from a JSON file.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
        Self::from_json(&text)
    }

    /// Parse a contract artifact or bare program from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let program = match value.get("program") {
            Some(inner) => inner.clone(),
            None => value,
        };
        Ok(serde_json::from_value(program)?)
    }

    /// The field prime as a big integer.
    pub fn field_prime(&self) -> Result<BigUint> {
        felt::parse_felt(&self.prime).ok_or_else(|| Error::InvalidPrime(self.prime.clone()))
    }

    /// The program's machine words as big integers.
    pub fn data_words(&self) -> Result<Vec<BigUint>> {
        self.data
            .iter()
            .map(|s| felt::parse_felt(s).ok_or_else(|| Error::InvalidFelt(s.clone())))
            .collect()
    }

    /// Function declarations, ordered by entry pc.
    pub fn function_decls(&self) -> Vec<FunctionDecl> {
        let mut decls: Vec<FunctionDecl> = self
            .identifiers
            .iter()
            .filter(|(_, ident)| ident.kind == "function")
            .filter_map(|(name, ident)| {
                Some(FunctionDecl {
                    name: name.clone(),
                    pc: ident.pc?,
                    decorators: ident.decorators.clone().unwrap_or_default(),
                })
            })
            .collect();
        decls.sort_by(|a, b| a.pc.cmp(&b.pc).then_with(|| a.name.cmp(&b.name)));
        decls
    }

    /// Label names keyed by pc, shortened to their last dotted segment.
    pub fn labels(&self) -> BTreeMap<u64, String> {
        self.identifiers
            .iter()
            .filter(|(_, ident)| ident.kind == "label")
            .filter_map(|(name, ident)| {
                let short = name.rsplit('.').next().unwrap_or(name);
                Some((ident.pc?, short.to_string()))
            })
            .collect()
    }

    /// Member names of a struct identifier, in declaration (offset) order.
    /// `None` when the identifier is absent or carries no members.
    pub fn member_names(&self, scope: &str) -> Option<Vec<String>> {
        let members = self.identifiers.get(scope)?.members.as_ref()?;
        let mut named: Vec<(u64, &str)> = members
            .iter()
            .filter_map(|(name, member)| Some((member.offset?, name.as_str())))
            .collect();
        named.sort();
        Some(named.into_iter().map(|(_, name)| name.to_string()).collect())
    }

    /// The hint text attached at `pc`, entries joined into one snippet.
    pub fn hint_at(&self, pc: u64) -> Option<String> {
        let hints = self.hints.get(&pc.to_string())?;
        if hints.is_empty() {
            return None;
        }
        Some(
            hints
                .iter()
                .map(|h| h.code.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}
