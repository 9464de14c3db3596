//! Break and continue targets of the enclosing statements.
//!
//! Loops push both a break and a continue target; `switch` pushes only a
//! break target, so `continue` inside a switch reaches the enclosing loop.

use ycc_core::{GenerationError, Span};

#[derive(Debug, Default)]
pub struct JumpTargets {
    breaks: Vec<u32>,
    continues: Vec<u32>,
}

impl JumpTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, break_label: u32, continue_label: u32) {
        self.breaks.push(break_label);
        self.continues.push(continue_label);
    }

    pub fn exit_loop(&mut self) {
        self.breaks.pop();
        self.continues.pop();
    }

    pub fn enter_switch(&mut self, break_label: u32) {
        self.breaks.push(break_label);
    }

    pub fn exit_switch(&mut self) {
        self.breaks.pop();
    }

    pub fn break_target(&self, span: Span) -> Result<u32, GenerationError> {
        self.breaks.last().copied().ok_or(GenerationError::Internal {
            message: "break without a target".to_string(),
            span,
        })
    }

    pub fn continue_target(&self, span: Span) -> Result<u32, GenerationError> {
        self.continues.last().copied().ok_or(GenerationError::Internal {
            message: "continue without a target".to_string(),
            span,
        })
    }

    pub fn depth(&self) -> usize {
        self.breaks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_loops_use_the_innermost_targets() {
        let mut jumps = JumpTargets::new();
        jumps.enter_loop(4, 3);
        jumps.enter_loop(9, 7);
        assert_eq!(jumps.break_target(Span::default()), Ok(9));
        assert_eq!(jumps.continue_target(Span::default()), Ok(7));

        jumps.exit_loop();
        assert_eq!(jumps.break_target(Span::default()), Ok(4));
        assert_eq!(jumps.continue_target(Span::default()), Ok(3));
    }

    #[test]
    fn switch_only_captures_break() {
        let mut jumps = JumpTargets::new();
        jumps.enter_loop(4, 2);
        jumps.enter_switch(12);
        assert_eq!(jumps.break_target(Span::default()), Ok(12));
        assert_eq!(jumps.continue_target(Span::default()), Ok(2));
        jumps.exit_switch();
        assert_eq!(jumps.depth(), 1);
    }

    #[test]
    fn targets_outside_any_statement_are_errors() {
        let jumps = JumpTargets::new();
        assert!(jumps.break_target(Span::default()).is_err());
        assert!(jumps.continue_target(Span::default()).is_err());
    }
}
