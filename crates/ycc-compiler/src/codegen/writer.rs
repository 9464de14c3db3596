//! Line-oriented buffer for one function body.
//!
//! Temporaries and labels share one counter that starts at 1 for every
//! function. Labels are printed as comments, `; <label>:N`, after a blank
//! line.

use std::fmt::Display;

use super::operand::Operand;

#[derive(Debug)]
pub struct IrWriter {
    out: String,
    next: u32,
    /// The last emitted instruction was `br` or `ret`.
    terminated: bool,
}

impl Default for IrWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IrWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            next: 1,
            terminated: false,
        }
    }

    /// Take the next number for a temporary or a label.
    pub fn fresh(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Emit one indented instruction.
    pub fn emit(&mut self, instruction: impl Display) {
        self.out.push_str("  ");
        self.out.push_str(&instruction.to_string());
        self.out.push('\n');
        self.terminated = false;
    }

    /// Emit `%N = <rhs>` with a fresh `N`.
    pub fn value(&mut self, rhs: impl Display) -> Operand {
        let n = self.fresh();
        self.emit(format_args!("%{n} = {rhs}"));
        Operand::Reg(n)
    }

    pub fn label(&mut self, label: u32) {
        self.out.push_str(&format!("\n; <label>:{label}\n"));
        self.terminated = false;
    }

    /// Unconditional branch. Nothing is emitted right after another
    /// terminator.
    pub fn br(&mut self, target: u32) {
        if self.terminated {
            return;
        }
        self.emit(format_args!("br label %{target}"));
        self.terminated = true;
    }

    pub fn cond_br(&mut self, cond: &Operand, then_label: u32, else_label: u32) {
        if self.terminated {
            return;
        }
        self.emit(format_args!(
            "br i1 {cond}, label %{then_label}, label %{else_label}"
        ));
        self.terminated = true;
    }

    pub fn ret(&mut self, ty: &str, value: &Operand) {
        self.emit(format_args!("ret {ty} {value}"));
        self.terminated = true;
    }

    pub fn ret_void(&mut self) {
        self.emit("ret void");
        self.terminated = true;
    }

    pub fn unreachable(&mut self) {
        self.emit("unreachable");
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporaries_and_labels_share_a_counter() {
        let mut writer = IrWriter::new();
        let value = writer.value("load i32, i32* %x, align 4");
        let label = writer.fresh();
        assert_eq!(value, Operand::Reg(1));
        assert_eq!(label, 2);
    }

    #[test]
    fn labels_are_comments_after_a_blank_line() {
        let mut writer = IrWriter::new();
        writer.br(1);
        writer.label(1);
        writer.ret_void();
        assert_eq!(writer.finish(), "  br label %1\n\n; <label>:1\n  ret void\n");
    }

    #[test]
    fn branches_after_a_terminator_are_dropped() {
        let mut writer = IrWriter::new();
        writer.ret("i32", &Operand::constant("0"));
        writer.br(3);
        assert!(writer.is_terminated());
        assert_eq!(writer.finish(), "  ret i32 0\n");
    }
}
