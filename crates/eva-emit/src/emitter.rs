use crate::config::EmitterConfig;
use anyhow::Result;
use colored::Colorize;
use eva_core::{
    BasicBlock, Function, Instruction, Module, Signature, Terminator, Value,
};
use std::io::Write;

enum Style {
    Keyword,
    Label,
    Comment,
    Symbol,
}

/// Renders modules in a Cranelift-flavored text form.
pub struct IrEmitter {
    config: EmitterConfig,
}

impl IrEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn write_module<W: Write>(&self, module: &Module, writer: &mut W) -> Result<()> {
        writer.write_all(self.emit_module(module).as_bytes())?;
        Ok(())
    }

    pub fn emit_module(&self, module: &Module) -> String {
        let mut output = String::new();
        output.push_str(&self.paint(&format!("; module {}", module.name), Style::Comment));
        output.push('\n');

        if !module.globals.is_empty() {
            output.push('\n');
            for global in module.globals.values() {
                let kind = if global.is_constant { "constant" } else { "global" };
                output.push_str(&format!(
                    "{} = {} {} {}, align {}\n",
                    self.paint(&format!("@{}", global.name), Style::Symbol),
                    self.paint(kind, Style::Keyword),
                    global.ty,
                    global.initializer,
                    global.align
                ));
            }
        }

        if !module.strings.is_empty() {
            output.push('\n');
            for string in &module.strings {
                output.push_str(&format!(
                    "{} = {} [{} x i8] {:?}\n",
                    string.id,
                    self.paint("string", Style::Keyword),
                    string.byte_len(),
                    string.value
                ));
            }
        }

        let declarations: Vec<_> = module.declarations().collect();
        if !declarations.is_empty() {
            output.push('\n');
            for function in declarations {
                output.push_str(&format!(
                    "{} {}\n",
                    self.paint("declare", Style::Keyword),
                    self.format_signature(&function.signature)
                ));
            }
        }

        for function in module.defined_functions() {
            output.push('\n');
            self.print_function(&mut output, function, module);
        }

        output
    }

    pub fn emit_function(&self, function: &Function, module: &Module) -> String {
        let mut output = String::new();
        self.print_function(&mut output, function, module);
        output
    }

    fn print_function(&self, output: &mut String, function: &Function, module: &Module) {
        output.push_str(&format!(
            "{} {} {{\n",
            self.paint("function", Style::Keyword),
            self.format_signature(&function.signature)
        ));

        if let Some(body) = &function.body {
            for (i, block) in body.blocks_in_layout().enumerate() {
                if i > 0 {
                    output.push('\n');
                }
                self.print_block(output, block, module);
            }
        }

        output.push_str("}\n");
    }

    fn print_block(&self, output: &mut String, block: &BasicBlock, module: &Module) {
        let label = self.paint(&format!("{}:", block.id), Style::Label);
        if self.config.block_comments {
            output.push_str(&format!(
                "{}  {}\n",
                label,
                self.paint(&format!("; {}", block.name), Style::Comment)
            ));
        } else {
            output.push_str(&format!("{}\n", label));
        }

        let indent = self.config.indent_style.render();
        for inst in &block.instructions {
            output.push_str(&format!("{}{}\n", indent, self.format_instruction(inst, module)));
        }
        output.push_str(&format!(
            "{}{}\n",
            indent,
            self.format_terminator(&block.terminator, module)
        ));
    }

    pub fn format_instruction(&self, inst: &Instruction, module: &Module) -> String {
        match inst {
            Instruction::Alloca { slot, ty, name } => {
                let text = format!("{} = alloca.{}", slot, ty);
                if self.config.slot_names {
                    format!("{}  {}", text, self.paint(&format!("; {}", name), Style::Comment))
                } else {
                    text
                }
            }
            Instruction::Load {
                result,
                ty,
                address,
            } => format!(
                "{} = load.{} {}",
                result,
                ty,
                self.format_value(address, module)
            ),
            Instruction::Store { address, value } => format!(
                "store {}, {}",
                self.format_value(value, module),
                self.format_value(address, module)
            ),
            Instruction::Binary {
                result,
                op,
                left,
                right,
            } => format!(
                "{} = {} {}, {}",
                result,
                op.mnemonic(),
                self.format_value(left, module),
                self.format_value(right, module)
            ),
            Instruction::Icmp {
                result,
                cond,
                left,
                right,
            } => format!(
                "{} = icmp {} {}, {}",
                result,
                cond.mnemonic(),
                self.format_value(left, module),
                self.format_value(right, module)
            ),
            Instruction::Call {
                result,
                callee,
                args,
            } => format!(
                "{} = call {}({})",
                result,
                self.paint(&format!("%{}", callee), Style::Symbol),
                self.format_values(args, module)
            ),
            Instruction::Phi {
                result,
                ty,
                incoming,
            } => {
                let edges: Vec<String> = incoming
                    .iter()
                    .map(|(value, block)| format!("[{}, {}]", self.format_value(value, module), block))
                    .collect();
                format!("{} = phi.{} {}", result, ty, edges.join(", "))
            }
        }
    }

    fn format_terminator(&self, terminator: &Terminator, module: &Module) -> String {
        match terminator {
            Terminator::Jump(target) => format!("jump {}", target),
            Terminator::Branch {
                condition,
                then_block,
                else_block,
            } => format!(
                "brif {}, {}, {}",
                self.format_value(condition, module),
                then_block,
                else_block
            ),
            Terminator::Return(Some(value)) => format!("return {}", self.format_value(value, module)),
            Terminator::Return(None) => "return".to_string(),
            Terminator::Invalid => self.paint("; missing terminator", Style::Comment),
        }
    }

    /// Globals print by name; everything else uses its id.
    fn format_value(&self, value: &Value, module: &Module) -> String {
        match value {
            Value::Global(id) => match module.global(*id) {
                Some(global) => self.paint(&format!("@{}", global.name), Style::Symbol),
                None => id.to_string(),
            },
            Value::Function(_) => self.paint(&value.to_string(), Style::Symbol),
            other => other.to_string(),
        }
    }

    fn format_values(&self, values: &[Value], module: &Module) -> String {
        values
            .iter()
            .map(|v| self.format_value(v, module))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn format_signature(&self, signature: &Signature) -> String {
        let mut params: Vec<String> = signature.params.iter().map(|p| p.to_string()).collect();
        if signature.variadic {
            params.push("...".to_string());
        }
        format!(
            "{}({}) -> {}",
            self.paint(&format!("%{}", signature.name), Style::Symbol),
            params.join(", "),
            signature.ret
        )
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if !self.config.use_colors {
            return text.to_string();
        }
        match style {
            Style::Keyword => text.blue().bold().to_string(),
            Style::Label => text.cyan().to_string(),
            Style::Comment => text.green().to_string(),
            Style::Symbol => text.yellow().to_string(),
        }
    }
}

impl Default for IrEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}
