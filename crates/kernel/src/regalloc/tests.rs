use expect_test::expect;
use ptxk_core::{AddressMode, Slot};

use super::{RegisterMap, assign_registers};
use crate::tests::{LOOP, build, expect_cfg};

#[test]
fn destination_first() {
    let mut cfg = build("add.s32 %r1, %r2, %r3;\nexit;").unwrap();
    let map = assign_registers(&mut cfg);

    assert_eq!(map.iter().collect::<Vec<_>>(), [("%r1", 0), ("%r2", 1), ("%r3", 2)]);

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                add.s32 %r0, %r1, %r2
                exit
            b0 -> b2 (fallthrough)
            b2 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn guards_and_secondary_predicates_come_last() {
    let mut cfg = build(
        r"
        setp.lt.s32 %p1|%p2, %r1, %r2;
        @%p3 add.s32 %r3, %r1, 1;
        exit;
        ",
    )
    .unwrap();

    let map = assign_registers(&mut cfg);
    assert_eq!(
        map.iter().collect::<Vec<_>>(),
        [("%p1", 0), ("%r1", 1), ("%r2", 2), ("%p2", 3), ("%r3", 4), ("%p3", 5)]
    );
}

#[test]
fn same_name_same_id() {
    let mut cfg = build(LOOP).unwrap();
    let map = assign_registers(&mut cfg);

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("%r1"), Some(0));
    assert_eq!(map.name(1), Some("%p1"));

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                mov.u32 %r0, 0
            b3 L_loop:
                add.u32 %r0, %r0, 1
                setp.lt.u32 %p1, %r0, 10
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

    for instruction in cfg.blocks().flat_map(|it| &it.instructions) {
        for slot in Slot::ALL {
            let op = instruction.operand(slot);
            if op.mode == AddressMode::Register {
                assert!(op.identifier.is_empty(), "`{instruction}` still names `{}`", op.identifier);
            }
        }
    }
}

#[test]
fn vectors_and_addresses() {
    let mut cfg = build(
        r"
        ld.global.v2.f32 {%f1, %f2}, [%rd1+8];
        st.global.f32 [%rd1], %f2;
        st.shared.u32 [tile], %tid.x;
        exit;
        ",
    )
    .unwrap();

    let map = assign_registers(&mut cfg);
    assert_eq!(map.iter().collect::<Vec<_>>(), [("%f1", 0), ("%f2", 1), ("%rd1", 2)]);

    expect_cfg(
        &cfg,
        expect![[r#"
            b0 entry:
            b1 exit:
            b2:
                ld.global.v2.f32 {%r0, %r1}, [%r2+8]
                st.global.f32 [%r2], %r1
                st.shared.u32 [tile], %tid.x
                exit
            b0 -> b2 (fallthrough)
            b2 -> b1 (fallthrough)
        "#]],
    );
}

#[test]
fn second_pass_is_a_no_op() {
    let mut cfg = build(LOOP).unwrap();
    let mut map = assign_registers(&mut cfg);
    let first = cfg.to_string();

    map.assign(&mut cfg);
    assert_eq!(map.len(), 2);
    assert_eq!(cfg.to_string(), first);

    let fresh = assign_registers(&mut cfg);
    assert!(fresh.is_empty());
    assert_eq!(cfg.to_string(), first);
}

#[test]
fn existing_names_keep_their_ids() {
    let mut map = RegisterMap::new();

    let mut cfg = build("mov.u32 %r9, %r8;\nexit;").unwrap();
    map.assign(&mut cfg);

    let mut cfg = build("mov.u32 %r7, %r9;\nexit;").unwrap();
    map.assign(&mut cfg);

    assert_eq!(map.iter().collect::<Vec<_>>(), [("%r9", 0), ("%r8", 1), ("%r7", 2)]);
}
