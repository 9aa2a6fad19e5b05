use expect_test::expect;
use ptxk_core::Opcode;

use crate::tests::{LOOP, build, expect_cfg};
use crate::{BlockId, BuildError, EdgeKind};

#[test]
fn straight_line() {
    let cfg = build("add.s32 %r1, %r2, %r3;\nexit;").unwrap();

    assert_eq!(cfg.len(), 3);
    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                add.s32 %r1, %r2, %r3
                exit
            b0 -> b2 (fallthrough)
            b2 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn loop_back_edge() {
    let cfg = build(LOOP).unwrap();

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                mov.u32 %r1, 0
            b3 L_loop:
                add.u32 %r1, %r1, 1
                setp.lt.u32 %p1, %r1, 10
                @%p1 bra L_loop
            b4:
                exit
            b0 -> b2 (fallthrough)
            b2 -> b3 (fallthrough)
            b3 -> b4 (fallthrough)
            b4 -> b1 (fallthrough)
            b3 -> b3 (branch)
        "#]],
    );
}

#[test]
fn unconditional_branch_has_no_fall_through() {
    let cfg = build("bra.uni L_end;\nL_end:\nexit;").unwrap();

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                bra.uni L_end
            b3 L_end:
                exit
            b0 -> b2 (fallthrough)
            b3 -> b1 (fallthrough)
            b2 -> b3 (branch)
        "#]],
    );

    let kinds: Vec<_> = cfg.successors(BlockId(2)).map(|edge| edge.kind).collect();
    assert_eq!(kinds, [EdgeKind::Branch]);
}

#[test]
fn never_taken_branch_only_falls_through() {
    let cfg = build("@!pt bra L_end;\nL_end:\nexit;").unwrap();

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                @!pt bra L_end
            b3 L_end:
                exit
            b0 -> b2 (fallthrough)
            b2 -> b3 (fallthrough)
            b3 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn ret_branches_to_exit() {
    let cfg = build("ret;\nL_after:\nexit;").unwrap();

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                ret
            b3 L_after:
                exit
            b0 -> b2 (fallthrough)
            b2 -> b1 (branch)
            b3 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn labels_on_empty_blocks_are_shared_with_following_code() {
    let cfg = build("L_a:\nadd.u32 %r1, %r1, 1;\nexit;").unwrap();

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2 L_a:
                add.u32 %r1, %r1, 1
                exit
            b0 -> b2 (fallthrough)
            b2 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn missing_exit() {
    assert_eq!(build("L1:\nbra.uni L1;").unwrap_err(), BuildError::MissingExit);
}

#[test]
fn duplicate_exit() {
    let err = build("@%p1 bra L2;\nexit;\nL2:\nexit;").unwrap_err();
    assert_eq!(err, BuildError::DuplicateExit { statement: 3 });
}

#[test]
fn duplicate_label() {
    let err = build("L1:\nadd.u32 %r1, %r1, 1;\nL1:\nexit;").unwrap_err();
    assert_eq!(err, BuildError::DuplicateLabel { label: "L1".to_owned(), statement: 2 });

    let err = build("L1:\nL1:\nexit;").unwrap_err();
    assert_eq!(err, BuildError::DuplicateLabel { label: "L1".to_owned(), statement: 1 });
}

#[test]
fn undefined_label() {
    let err = build("bra.uni L_missing;\nexit;").unwrap_err();
    assert_eq!(err, BuildError::UndefinedLabel { label: "L_missing".to_owned() });

    // never taken, but still has to resolve.
    let err = build("@!pt bra L_nowhere;\nexit;").unwrap_err();
    assert_eq!(err, BuildError::UndefinedLabel { label: "L_nowhere".to_owned() });
}

#[test]
fn trailing_empty_block_takes_its_label() {
    let err = build("@%p1 bra L_tail;\nexit;\nL_tail:").unwrap_err();
    assert_eq!(err, BuildError::UndefinedLabel { label: "L_tail".to_owned() });
}

#[test]
fn calls_are_unsupported() {
    let err = build("call foo;\nexit;").unwrap_err();
    assert_eq!(err, BuildError::UnsupportedControlFlow { opcode: Opcode::Call, statement: 0 });
    assert_eq!(err.to_string(), "unhandled control flow instruction `call` (statement 0)");
}

#[test]
fn executable_sequence_keeps_fall_through_pairs() {
    let cfg = build(
        r"
        bra.uni L_end;
        add.u32 %r1, %r1, 1;
    L_end:
        exit;
        ",
    )
    .unwrap();

    let sequence = cfg.executable_sequence();
    assert_eq!(sequence, [BlockId(0), BlockId(2), BlockId(3), BlockId(4), BlockId(1)]);

    for edge in cfg.edges().iter().filter(|it| it.kind == EdgeKind::FallThrough && it.tail != cfg.exit()) {
        let head = sequence.iter().position(|&it| it == edge.head).unwrap();
        assert_eq!(sequence[head + 1], edge.tail, "{edge}");
    }
}

#[test]
fn blocks_without_dead_code_are_reachable() {
    let cfg = build(LOOP).unwrap();

    for block in cfg.blocks().filter(|it| it.id != cfg.entry()) {
        assert!(cfg.predecessors(block.id).next().is_some(), "{} has no predecessors", block.id);
    }
}

#[test]
fn code_after_unconditional_transfer_has_no_predecessors() {
    let unreachable = |src: &str| {
        let cfg = build(src).unwrap();
        cfg.blocks()
            .filter(|it| it.id != cfg.entry() && cfg.predecessors(it.id).next().is_none())
            .map(|it| it.id)
            .collect::<Vec<_>>()
    };

    let dead = [BlockId(3)];
    assert_eq!(unreachable("exit;\nadd.u32 %r1, %r1, 1;"), dead);
    assert_eq!(unreachable("ret;\nadd.u32 %r1, %r1, 1;\nexit;"), dead);
    assert_eq!(unreachable("bra.uni L_end;\nadd.u32 %r1, %r1, 1;\nL_end:\nexit;"), dead);

    // a label makes the same code reachable again.
    assert!(unreachable("bra.uni L_mid;\nL_mid:\nadd.u32 %r1, %r1, 1;\nexit;").is_empty());
}
