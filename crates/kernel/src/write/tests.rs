use expect_test::expect;
use ptxk_core::{Opcode, Statement};

use crate::tests::{kernel, statements};
use crate::{Kernel, WriteOptions};

const ADD_ONE: &str = r"
.entry add_one(.param .u32 n)
{
    .local .align 4 .u32 scratch[16];
    .shared .f32 tile[256];
    mov.u32 %r1, %tid.x;
    setp.ge.u32 %p1, %r1, 32;
    @%p1 bra L_done;
    add.u32 %r2, %r1, 1;
L_done:
    exit;
}
";

fn render(kernel: &Kernel, options: &WriteOptions) -> String {
    let mut out = Vec::new();
    kernel.write(&mut out, options).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn full_kernel() {
    let kernel = kernel(ADD_ONE);

    expect![[r#"
        .entry add_one(.param .u32 n)
        {
            .local .align 4 .u32 scratch[16];
            .shared .f32 tile[256];
            .reg .u32 %r0;
            .reg .pred %p1;
            .reg .u32 %r2;
            $__Block_2:
                mov.u32 %r0, %tid.x;
                setp.ge.u32 %p1, %r0, 32;
                @%p1 bra L_done;
            $__Block_3:
                add.u32 %r2, %r0, 1;
            L_done:
                exit;
        }
    "#]]
    .assert_eq(&render(&kernel, &WriteOptions::default()));
}

#[test]
fn banner_and_empty_parameter_list() {
    let kernel = kernel(".entry trivial\nexit;");
    let options = WriteOptions { banner: Some("ptxk 0.1.0".to_owned()) };

    expect![[r#"
        /* ptxk 0.1.0 */
        .entry trivial()
        {
            $__Block_2:
                exit;
        }
    "#]]
    .assert_eq(&kernel.display(&options).to_string());
}

#[test]
fn empty_kernel() {
    expect![[r#"
        .entry empty()
        {
        }
    "#]]
    .assert_eq(&Kernel::new("empty").display(&WriteOptions::default()).to_string());
}

#[test]
fn canonical_labels() {
    let mut kernel = kernel(ADD_ONE);
    kernel.canonical_block_labels(7);

    let text = render(&kernel, &WriteOptions::default());

    expect![[r#"
        .entry add_one(.param .u32 n)
        {
            .local .align 4 .u32 scratch[16];
            .shared .f32 tile[256];
            .reg .u32 %r0;
            .reg .pred %p1;
            .reg .u32 %r2;
            $BB_7_0002:
                mov.u32 %r0, %tid.x;
                setp.ge.u32 %p1, %r0, 32;
                @%p1 bra $BB_7_0004;
            $BB_7_0003:
                add.u32 %r2, %r0, 1;
            $BB_7_0004: /* L_done */
                exit;
        }
    "#]]
    .assert_eq(&text);

    let comments: Vec<_> = kernel.cfg().blocks().map(|it| it.comment.as_str()).collect();
    assert_eq!(comments, ["", "", "", "", "L_done"]);
}

#[test]
fn canonical_output_reads_back() {
    let mut kernel = kernel(ADD_ONE);
    kernel.canonical_block_labels(0);
    let text = render(&kernel, &WriteOptions::default());

    let statements = statements(&text);

    let labels: Vec<_> = statements
        .iter()
        .filter_map(|it| match it {
            Statement::Label(label) => Some(label.as_str()),
            _ => None,
        })
        .collect();

    for statement in &statements {
        if let Statement::Instruction(instruction) = statement {
            if instruction.opcode == Opcode::Bra {
                assert!(labels.contains(&instruction.d.identifier.as_str()), "`{instruction}` has no target");
            }
        }
    }

    let again = Kernel::from_statements(&statements).unwrap();
    assert_eq!(again.register_declarations(), kernel.register_declarations());
    assert_eq!(again.cfg().edges(), kernel.cfg().edges());
}

#[test]
fn synthetic_labels_avoid_user_labels() {
    let kernel = kernel("@%p1 bra $__Block_3;\nadd.u32 %r1, %r1, 1;\n$__Block_3:\nexit;");
    let text = render(&kernel, &WriteOptions::default());

    let labels: Vec<_> = text.lines().map(str::trim).filter(|it| it.ends_with(':')).collect();
    assert_eq!(labels, ["$__Block_2:", "$__Block_3_1:", "$__Block_3:"]);

    let again = Kernel::from_statements(&statements(&text)).unwrap();
    assert_eq!(again.cfg().edges(), kernel.cfg().edges());
}

#[test]
fn unnamed_kernel_reads_back() {
    let mut kernel = kernel("exit;");
    kernel.canonical_block_labels(0);
    let text = render(&kernel, &WriteOptions::default());

    expect![[r#"
        .entry ()
        {
            $BB_0_0002:
                exit;
        }
    "#]]
    .assert_eq(&text);

    let again = Kernel::from_statements(&statements(&text)).unwrap();
    assert_eq!(again.name, "");
    assert_eq!(again.cfg().edges(), kernel.cfg().edges());
}
