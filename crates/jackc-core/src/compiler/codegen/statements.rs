//! Statement lowering documentation.
//!
//! This module documents the statement translations performed in `mod.rs`.
//! Every statement compiles to a fixed instruction shape around the code of
//! its nested expressions; there is no separate parse-then-generate phase.
//!
//! ## Statement Lowering Overview
//!
//! | Statement | Shape | Notes |
//! |-----------|-------|-------|
//! | `let v = e;` | `[e]`, `pop seg i` | field targets anchor pointer 0 first |
//! | `let v[a] = e;` | `[v]`, `[a]`, `add`, `[e]`, temp/pointer-1 shuffle | stores through `that 0` |
//! | `if (c) {A} else {B}` | `[c]`, `not`, `if-goto L1`, `[A]`, `goto L2`, `label L1`, `[B]`, `label L2` | labels and goto emitted even when A/B are empty |
//! | `while (c) {S}` | `label L1`, `[c]`, `not`, `if-goto L2`, `[S]`, `goto L1`, `label L2` | separate counter from `if` |
//! | `do call;` | `[call]`, `pop temp 0` | result discarded |
//! | `return;` | `push constant 0`, `return` | callers always pop one result |
//! | `return e;` | `[e]`, `return` | |
//!
//! ## Label Naming
//!
//! Generated labels are qualified by class and subroutine so they can never
//! collide across subroutines:
//!
//! ```text
//! <Class>.<subroutine>.IF_L1$<n>     else-branch target of the n-th if
//! <Class>.<subroutine>.IF_L2$<n>     join point of the n-th if
//! <Class>.<subroutine>.WHILE_L1$<n>  loop head of the n-th while
//! <Class>.<subroutine>.WHILE_L2$<n>  loop exit of the n-th while
//! ```
//!
//! The `if` and `while` counters are independent and both reset to zero at
//! the start of each subroutine.
//!
//! ## Field Targets
//!
//! A field lives at an offset into the heap block addressed by pointer 0,
//! so a `let` whose target is a field first anchors the pointer at the
//! current receiver (argument 0 in a method, local 0 in a constructor):
//!
//! ```text
//! let x = x + 1;        // x is field 0, inside a method
//!
//! push argument 0       ; anchor for the write target
//! pop pointer 0
//! push argument 0       ; re-anchor for the read of x
//! pop pointer 0
//! push this 0
//! push constant 1
//! add
//! pop this 0
//! ```
//!
//! The re-anchor before each access is redundant between consecutive field
//! accesses; the engine accepts the extra instructions to stay stateless
//! between statements.
