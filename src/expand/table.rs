// src/expand/table.rs

use std::collections::HashMap;

use crate::errors::{ParseError, ParseErrorKind};
use crate::parse::{BuildFile, MacroDecl};

/// All macro declarations of a build file, by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    decls: Vec<MacroDecl>,
    by_name: HashMap<String, usize>,
}

impl MacroTable {
    /// Collect macro declarations, rejecting a name declared twice.
    pub fn from_build_file(file: &BuildFile) -> Result<Self, ParseError> {
        let mut table = MacroTable::default();

        for decl in file.macros() {
            if let Some(previous) = table.get(&decl.name) {
                return Err(ParseError::new(
                    file.origin.clone(),
                    decl.position,
                    ParseErrorKind::DuplicateMacro {
                        name: decl.name.clone(),
                        previous: previous.position,
                    },
                ));
            }
            table.by_name.insert(decl.name.clone(), table.decls.len());
            table.decls.push(decl.clone());
        }

        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&MacroDecl> {
        self.by_name.get(name).and_then(|&i| self.decls.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
