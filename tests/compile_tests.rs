// tests/compile_tests.rs
//! End-to-end compilation of the sample programs in `test_scripts/`.

mod test_harness;

use test_harness::{TestHarness, compile_str};

#[test]
fn calculator_compiles() {
    let harness = TestHarness::new();
    let result = harness.compile_file("arithmetic.java");
    let ir = result.assert_success();

    assert!(ir.starts_with("; ModuleID = 'arithmetic.java'\n"));
    assert!(ir.contains("%Calculator = type opaque\n"));
    for header in [
        "define i32 @Calculator.add(i32 %a, i32 %b) {",
        "define i64 @Calculator.widen(i32 %a, i64 %b) {",
        "define double @Calculator.average(i32* %values, i32 %count) {",
        "define i1 @Calculator.inRange(i32 %x, i32 %lo, i32 %hi) {",
        "define i32 @Calculator.clamp(i32 %x) {",
    ] {
        assert!(ir.contains(header), "missing {header}\n{ir}");
    }
    assert!(!ir.contains("@malloc"));
}

#[test]
fn narrower_operands_are_widened() {
    let result = TestHarness::new().compile_file("arithmetic.java");
    result.assert_ir_contains_in_order(&[
        "define i64 @Calculator.widen(i32 %a, i64 %b) {",
        "  %3 = sext i32 %1 to i64\n  %4 = mul nsw i64 %3, %2\n  ret i64 %4\n",
        "define double @Calculator.average(i32* %values, i32 %count) {",
        "  store double 0.0, double* %sum, align 8\n",
        "  %10 = getelementptr inbounds i32, i32* %8, i32 %9\n  %11 = load i32, i32* %10, align 4\n  %12 = sitofp i32 %11 to double\n",
        "  %14 = fadd double %13, %12\n",
        "  %19 = sitofp i32 %18 to double\n  %20 = fdiv double %17, %19\n  ret double %20\n",
    ]);
}

#[test]
fn logical_and_ternary_lowering() {
    let result = TestHarness::new().compile_file("arithmetic.java");
    result.assert_ir_contains_in_order(&[
        "define i1 @Calculator.inRange(i32 %x, i32 %lo, i32 %hi) {",
        "  %3 = icmp sge i32 %1, %2\n",
        "  %6 = icmp sle i32 %4, %5\n  %7 = and i1 %3, %6\n  ret i1 %7\n",
        "define i32 @Calculator.clamp(i32 %x) {",
        "  %2 = icmp slt i32 %1, 0\n  %3 = load i32, i32* %x.addr, align 4\n  %4 = select i1 %2, i32 0, i32 %3\n  ret i32 %4\n",
    ]);
}

#[test]
fn loops_branch_to_their_own_labels() {
    let result = TestHarness::new().compile_file("loops.java");
    result.assert_ir_contains_in_order(&[
        "define i32 @Loops.sumTo(i32 %n) {",
        "  br i1 true, label %2, label %3\n",
        "; <label>:7\n  br label %3\n",
        "; <label>:3\n  %14 = load i32, i32* %total, align 4\n  ret i32 %14\n",
        "define i32 @Loops.countdown(i32 %n) {",
        "  br label %1\n\n; <label>:1\n",
        "  br label %2\n\n; <label>:2\n",
        "  br i1 %7, label %1, label %3\n",
        "define i32 @Loops.classify(i32 %code) {",
        "  store i32 -1, i32* %result, align 4\n",
        "define i32 @Loops.skipOdd(i32 %n) {",
        "  %9 = srem i32 %8, 2\n  %10 = icmp eq i32 %9, 1\n",
        "; <label>:11\n  br label %3\n",
        "; <label>:4\n  %17 = load i32, i32* %evens, align 4\n  ret i32 %17\n",
    ]);
}

#[test]
fn switch_groups_fall_through() {
    let result = TestHarness::new().compile_file("loops.java");
    result.assert_ir_contains_in_order(&[
        "define i32 @Loops.classify(i32 %code) {",
        "  %1 = load i32, i32* %code.addr, align 4\n",
        "  %9 = icmp eq i32 %1, 0\n  br i1 %9, label %2, label %6\n",
        "; <label>:6\n  %10 = icmp eq i32 %1, 1\n  br i1 %10, label %3, label %7\n",
    ]);
}

#[test]
fn switch_case_chain_reaches_default() {
    let result = TestHarness::new().compile_file("loops.java");
    result.assert_ir_contains_in_order(&[
        "define i32 @Loops.classify(i32 %code) {",
        "; <label>:7\n  %11 = icmp eq i32 %1, 2\n  br i1 %11, label %4, label %5\n",
        "; <label>:2\n  store i32 10, i32* %result, align 4\n  br label %8\n",
        "; <label>:3\n  br label %4\n",
        "; <label>:4\n  store i32 20, i32* %result, align 4\n  br label %8\n",
        "; <label>:5\n  store i32 30, i32* %result, align 4\n  br label %8\n",
        "; <label>:8\n  %12 = load i32, i32* %result, align 4\n  ret i32 %12\n",
    ]);
}

#[test]
fn objects_members_and_literals() {
    let result = TestHarness::new().compile_file("objects.java");
    let ir = result.assert_success();

    for line in [
        "%Counter = type opaque\n",
        "%Main = type opaque\n",
        "@.str.0 = private unnamed_addr constant [8 x i8] c\"counter\\00\", align 1\n",
        "@.str.1 = private unnamed_addr constant [7 x i8] c\"hello\\0A\\00\", align 1\n",
        "@Counter.created = internal global i32 0, align 4\n",
        "@Counter.value = internal global i32 0, align 4\n",
        "@Counter.label = internal global i8* null, align 8\n",
        "declare i8* @malloc(i64)\n",
        "define void @Counter.Counter(i32 %start) {",
        "define i32 @Counter.next() {",
        "define void @main() {",
    ] {
        assert!(ir.contains(line), "missing {line:?}\n{ir}");
    }
    assert_eq!(ir.matches("@Counter.created = ").count(), 1);
}

#[test]
fn main_allocates_objects_and_arrays() {
    let result = TestHarness::new().compile_file("objects.java");
    result.assert_ir_contains_in_order(&[
        "define void @main() {",
        "  %args.addr = alloca i8**, align 8\n  %c = alloca %Counter*, align 8\n",
        "  %1 = call i8* @malloc(i64 12)\n  %2 = bitcast i8* %1 to %Counter*\n  call void @Counter.Counter(i32 5)\n  store %Counter* %2, %Counter** %c, align 8\n",
        "  %3 = call i32 @Counter.next()\n  store i32 %3, i32* %n, align 4\n",
        "  %4 = call i8* @malloc(i64 16)\n  %5 = bitcast i8* %4 to i32*\n",
        "  %9 = getelementptr inbounds i32, i32* %5, i64 3\n  store i32 9, i32* %9, align 4\n  store i32* %5, i32** %squares, align 8\n",
        "  %11 = getelementptr inbounds i32, i32* %10, i32 3\n  %12 = load i32, i32* %11, align 4\n  %13 = load i32, i32* @Counter.created, align 4\n  %14 = add nsw i32 %12, %13\n",
        "  store i8* getelementptr inbounds ([7 x i8], [7 x i8]* @.str.1, i64 0, i64 0), i8** %greeting, align 8\n",
        "  ret void\n}\n",
    ]);
}

#[test]
fn member_initializers_give_qualified_globals() {
    let result = compile_str("class Foo { int x = 5; }");
    let ir = result.assert_success();
    assert!(ir.contains("@Foo.x = internal global i32 0, align 4\n"), "{ir}");
}

#[test]
fn scenario_add_numbers_registers_from_one() {
    let result = compile_str("class A { int add(int a, int b) { return a + b; } }");
    result.assert_ir_contains_in_order(&[
        "  %1 = load i32, i32* %a.addr, align 4\n",
        "  %2 = load i32, i32* %b.addr, align 4\n",
        "  %3 = add nsw i32 %1, %2\n",
        "  ret i32 %3\n",
    ]);
}

#[test]
fn scenario_comparison_yields_boolean() {
    let result = compile_str("class A { void f() { boolean b = 1 < 2; } }");
    result.assert_ir_contains_in_order(&["  %1 = icmp slt i32 1, 2\n  store i1 %1, i1* %b, align 1\n"]);
}

#[test]
fn scenario_break_in_nested_blocks_targets_loop_end() {
    let result = compile_str("class A { void f(int n) { for (;;) { if (n > 0) { { break; } } } } }");
    result.assert_ir_contains_in_order(&[
        "; <label>:2\n",
        "  %6 = icmp sgt i32 %5, 0\n  br i1 %6, label %7, label %8\n",
        "; <label>:7\n  br label %4\n",
        "; <label>:4\n  ret void\n",
    ]);
}
