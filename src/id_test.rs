use super::*;

fn local(raw: u32) -> LocalId {
    LocalId::new(raw).unwrap()
}

// =============================================================================
// LocalId / GlobalId
// =============================================================================

#[test]
fn local_id_rejects_zero() {
    assert!(LocalId::new(0).is_none());
    assert_eq!(local(7).get(), 7);
    assert_eq!(local(7).to_string(), "7");
}

#[test]
fn generated_global_ids_are_unique_uuids() {
    let a = GlobalId::generate();
    let b = GlobalId::generate();
    assert_ne!(a, b);
    assert!(Uuid::parse_str(a.as_str()).is_ok());
}

#[test]
fn global_id_serializes_as_plain_string() {
    let id = GlobalId::from("abc-123");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    let back: GlobalId = serde_json::from_str("\"abc-123\"").unwrap();
    assert_eq!(back, id);
}

// =============================================================================
// claim / release
// =============================================================================

#[test]
fn ids_start_at_one_and_recycle_lifo() {
    let mut ids = IdRegistry::new();
    let a = ids.claim(Some("A".into()));
    let b = ids.claim(Some("B".into()));
    assert_eq!((a.get(), b.get()), (1, 2));

    assert_eq!(ids.release(a).unwrap(), GlobalId::from("A"));
    let c = ids.claim(Some("C".into()));
    let d = ids.claim(Some("D".into()));
    assert_eq!((c.get(), d.get()), (1, 3));
}

#[test]
fn recycling_is_last_in_first_out() {
    let mut ids = IdRegistry::new();
    let first: Vec<LocalId> = (0..4).map(|i| ids.claim(Some(format!("g{i}").into()))).collect();
    ids.release(first[1]).unwrap();
    ids.release(first[3]).unwrap();

    assert_eq!(ids.claim(None), first[3]);
    assert_eq!(ids.claim(None), first[1]);
    assert_eq!(ids.claim(None).get(), 5);
}

#[test]
fn claim_without_global_generates_one() {
    let mut ids = IdRegistry::new();
    let local = ids.claim(None);
    let global = ids.global_of(local).unwrap().clone();
    assert!(Uuid::parse_str(global.as_str()).is_ok());
    assert_eq!(ids.local_of(&global), Some(local));
}

#[test]
fn release_clears_both_directions() {
    let mut ids = IdRegistry::new();
    let g = GlobalId::from("gone");
    let l = ids.claim(Some(g.clone()));
    ids.release(l).unwrap();

    assert!(!ids.is_live(l));
    assert!(matches!(ids.global_of(l), Err(SceneError::UnknownLocalId(id)) if id == l));
    assert_eq!(ids.local_of(&g), None);
    assert!(ids.is_empty());
}

#[test]
fn release_of_unknown_id_is_an_error() {
    let mut ids = IdRegistry::new();
    assert_eq!(ids.release(local(3)), Err(SceneError::UnknownLocalId(local(3))));

    let l = ids.claim(None);
    ids.release(l).unwrap();
    assert_eq!(ids.release(l), Err(SceneError::UnknownLocalId(l)));
    // A double release must not push the id onto the free stack twice.
    let x = ids.claim(None);
    let y = ids.claim(None);
    assert_ne!(x, y);
}

#[test]
fn claiming_a_claimed_global_reuses_its_local_id() {
    let mut ids = IdRegistry::new();
    let first = ids.claim(Some("dup".into()));
    let second = ids.claim(Some("dup".into()));
    assert_eq!(first, second);
    assert_eq!(ids.len(), 1);
}

// =============================================================================
// reserve
// =============================================================================

#[test]
fn reserve_is_idempotent() {
    let mut ids = IdRegistry::new();
    let r1 = ids.reserve("member".into());
    let r2 = ids.reserve("member".into());
    assert_eq!(r1, r2);
    assert!(ids.is_reserved(&"member".into()));
    assert_eq!(ids.len(), 1);
}

#[test]
fn claim_consumes_reservation() {
    let mut ids = IdRegistry::new();
    let reserved = ids.reserve("member".into());
    let other = ids.claim(Some("other".into()));
    let claimed = ids.claim(Some("member".into()));

    assert_eq!(claimed, reserved);
    assert_ne!(other, reserved);
    assert!(!ids.is_reserved(&"member".into()));
    assert_eq!(ids.global_of(claimed).unwrap().as_str(), "member");
}

#[test]
fn reserved_ids_resolve_before_claim() {
    let mut ids = IdRegistry::new();
    let reserved = ids.reserve("early".into());
    assert_eq!(ids.local_of(&"early".into()), Some(reserved));
    assert!(ids.is_live(reserved));
}

#[test]
fn reserving_a_claimed_global_returns_its_id() {
    let mut ids = IdRegistry::new();
    let claimed = ids.claim(Some("x".into()));
    assert_eq!(ids.reserve("x".into()), claimed);
    assert!(!ids.is_reserved(&"x".into()));
}

#[test]
fn releasing_a_reservation_drops_it() {
    let mut ids = IdRegistry::new();
    let reserved = ids.reserve("r".into());
    ids.release(reserved).unwrap();
    assert!(!ids.is_reserved(&"r".into()));
    // A later claim mints a fresh mapping rather than resurrecting the reservation.
    let claimed = ids.claim(Some("r".into()));
    assert_eq!(claimed, reserved);
    assert_eq!(ids.len(), 1);
}

// =============================================================================
// lookup strategies
// =============================================================================

fn exercise_bijection(mut ids: IdRegistry) {
    let locals: Vec<LocalId> = (0..20).map(|i| ids.claim(Some(format!("s{i}").into()))).collect();
    for l in locals.iter().step_by(3) {
        ids.release(*l).unwrap();
    }
    for i in 20..26 {
        ids.claim(Some(format!("s{i}").into()));
    }

    for (l, g) in ids.iter() {
        assert_eq!(ids.local_of(g), Some(l));
        assert_eq!(ids.global_of(l).unwrap(), g);
    }
    let mut globals: Vec<&GlobalId> = ids.iter().map(|(_, g)| g).collect();
    let before = globals.len();
    globals.dedup();
    globals.sort();
    globals.dedup();
    assert_eq!(globals.len(), before);
}

#[test]
fn scan_lookup_keeps_bijection() {
    exercise_bijection(IdRegistry::with_options(Lookup::Scan, false));
}

#[test]
fn indexed_lookup_keeps_bijection() {
    exercise_bijection(IdRegistry::with_options(Lookup::Indexed, false));
}

#[test]
fn indexed_lookup_forgets_released_ids() {
    let mut ids = IdRegistry::with_options(Lookup::Indexed, false);
    let l = ids.claim(Some("g".into()));
    ids.release(l).unwrap();
    assert_eq!(ids.probe(&"g".into()), None);
}

#[test]
fn local_of_misses_for_unknown_global() {
    let ids = IdRegistry::with_options(Lookup::Scan, false);
    assert_eq!(ids.local_of(&"nope".into()), None);
}

#[test]
fn iter_is_in_ascending_local_order() {
    let mut ids = IdRegistry::new();
    let a = ids.claim(Some("a".into()));
    let b = ids.claim(Some("b".into()));
    let c = ids.claim(Some("c".into()));
    ids.release(b).unwrap();
    let order: Vec<LocalId> = ids.iter().map(|(l, _)| l).collect();
    assert_eq!(order, vec![a, c]);
}

#[test]
fn clear_restarts_numbering() {
    let mut ids = IdRegistry::with_options(Lookup::Indexed, true);
    ids.claim(Some("a".into()));
    ids.reserve("b".into());
    ids.clear();

    assert!(ids.is_empty());
    assert!(!ids.is_reserved(&"b".into()));
    assert_eq!(ids.claim(None).get(), 1);
    assert_eq!(ids.probe(&"a".into()), None);
}
