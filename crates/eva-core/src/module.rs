use crate::function::{Function, Signature};
use crate::types::Type;
use crate::values::{Constant, GlobalId, StrId};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: GlobalId,
    pub name: String,
    pub ty: Type,
    pub initializer: Constant,
    pub is_constant: bool,
    pub align: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringConstant {
    pub id: StrId,
    pub value: String,
}

impl StringConstant {
    /// Length in bytes including the trailing NUL.
    pub fn byte_len(&self) -> usize {
        self.value.len() + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub globals: IndexMap<String, GlobalVariable>,
    pub strings: Vec<StringConstant>,
    pub functions: IndexMap<String, Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: IndexMap::new(),
            strings: Vec::new(),
            functions: IndexMap::new(),
        }
    }

    pub fn add_global(&mut self, name: &str, initializer: Constant) -> Result<GlobalId> {
        if self.globals.contains_key(name) {
            return Err(IrError::DuplicateSymbol(name.to_string()));
        }
        let id = GlobalId(self.globals.len() as u32);
        self.globals.insert(
            name.to_string(),
            GlobalVariable {
                id,
                name: name.to_string(),
                ty: initializer.ty(),
                initializer,
                is_constant: false,
                align: 4,
            },
        );
        Ok(id)
    }

    pub fn global(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.get_index(id.0 as usize).map(|(_, g)| g)
    }

    pub fn global_by_name(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.get(name)
    }

    /// Interns a read-only string; identical contents share one constant.
    pub fn add_string(&mut self, value: &str) -> StrId {
        if let Some(existing) = self.strings.iter().find(|s| s.value == value) {
            return existing.id;
        }
        let id = StrId(self.strings.len() as u32);
        self.strings.push(StringConstant {
            id,
            value: value.to_string(),
        });
        id
    }

    pub fn string(&self, id: StrId) -> Option<&StringConstant> {
        self.strings.get(id.0 as usize)
    }

    /// Declares an external function. Re-declaring with the same signature is a no-op.
    pub fn declare_function(&mut self, signature: Signature) -> Result<()> {
        match self.functions.get(&signature.name) {
            Some(existing) if existing.signature == signature => Ok(()),
            Some(_) => Err(IrError::DuplicateSymbol(signature.name)),
            None => {
                self.functions
                    .insert(signature.name.clone(), Function::declaration(signature));
                Ok(())
            }
        }
    }

    /// Adds a function with a body, replacing a matching declaration if present.
    pub fn define_function(&mut self, function: Function) -> Result<()> {
        let name = function.signature.name.clone();
        if let Some(existing) = self.functions.get(&name) {
            if !existing.is_declaration() || existing.signature != function.signature {
                return Err(IrError::DuplicateSymbol(name));
            }
        }
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| !f.is_declaration())
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| f.is_declaration())
    }
}
