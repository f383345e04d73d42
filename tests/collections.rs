use std::thread;

use fielderr::{List, SafeList, SafeSet, Set, errorf, is, is_any, new, wrap};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
struct Plain(&'static str);

#[test]
fn test_set_len() {
    let s = Set::new();
    assert_eq!(s.len(), 0);

    let err = new("A", &[]);
    s.add(err.clone());
    assert_eq!(s.len(), 1);
    s.add(err.clone());
    assert_eq!(s.len(), 1);
    s.add(new("A", &[]));
    assert_eq!(s.len(), 1);
    s.add(wrap(err, "B", &[]));
    assert_eq!(s.len(), 2);
}

#[test]
fn test_list_len() {
    let s = List::new();
    assert_eq!(s.len(), 0);

    let err = new("A", &[]);
    s.add(err.clone());
    assert_eq!(s.len(), 1);
    s.add(err.clone());
    assert_eq!(s.len(), 2);
    s.add(wrap(err, "B", &[]));
    assert_eq!(s.len(), 3);
}

#[test]
fn test_is_set() {
    let err = Plain("A");

    let s = Set::new();
    s.add(err.clone());
    s.clear();
    s.add(err.clone());
    assert!(is(&s.err().unwrap(), &err));

    let s = Set::new();
    s.add(err.clone());
    s.add(err.clone());
    assert!(is(&s.err().unwrap(), &err));

    let s = Set::new();
    s.add(new("B", &[]));
    assert!(!is(&s.err().unwrap(), &err));

    let s = Set::new();
    s.wrap(err.clone(), "C", &[]);
    s.add(new("D", &[]));
    assert!(is(&s.err().unwrap(), &err));

    let err2 = wrap(err.clone(), "abc", &[]);
    let s = Set::new();
    s.wrap(err2.clone(), "C", &[]);
    s.add(new("D", &[]));
    let composite = s.err().unwrap();
    assert!(is(&composite, &err));
    assert!(is(&composite, &err2));

    let err3 = errorf("AAA", &[]);
    let s = Set::new();
    s.wrap(err.clone(), "FF", &[]);
    s.wrap(err3.clone(), "F", &[]);
    let composite = s.err().unwrap();
    assert!(is(&composite, &err));
    assert!(is(&composite, &err3));
    assert!(!is(&composite, &err2));
    assert!(is_any(&composite, &err2, &[&err3]));
    assert!(is_any(&composite, &err3, &[&err2]));
    assert!(!is_any(&composite, &err2, &[&err2, &err2, &err2, &err2, &err2, &err2, &err2]));
    assert!(is_any(
        &composite,
        &err2,
        &[&err2, &err2, &err2, &err2, &err2, &err2, &err2, &err3]
    ));
}

#[test]
fn test_is_list() {
    let err = Plain("A");

    let s = List::new();
    s.add(err.clone());
    assert!(is(&s.err().unwrap(), &err));

    let s = List::new();
    s.add(err.clone());
    s.add(err.clone());
    assert!(is(&s.err().unwrap(), &err));

    let s = List::new();
    s.add(new("B", &[]));
    assert!(!is(&s.err().unwrap(), &err));

    let s = List::new();
    s.wrap(err.clone(), "C", &[]);
    s.add(new("D", &[]));
    assert!(is(&s.err().unwrap(), &err));

    let err2 = wrap(err.clone(), "abc", &[]);
    let s = List::new();
    s.wrap(err2.clone(), "C", &[]);
    s.add(new("D", &[]));
    let composite = s.err().unwrap();
    assert!(is(&composite, &err));
    assert!(is(&composite, &err2));

    let err3 = errorf("AAA", &[]);
    let s = List::new();
    s.wrap(err.clone(), "FF", &[]);
    s.wrap(err3.clone(), "F", &[]);
    let composite = s.err().unwrap();
    assert!(is(&composite, &err));
    assert!(is(&composite, &err3));
    assert!(!is(&composite, &err2));
    assert!(is_any(&composite, &err2, &[&err3]));
    assert!(is_any(&composite, &err3, &[&err2]));
    assert!(!is_any(&composite, &err2, &[&err2, &err2, &err2, &err2, &err2, &err2, &err2]));
    assert!(is_any(
        &composite,
        &err2,
        &[&err2, &err2, &err2, &err2, &err2, &err2, &err2, &err3]
    ));
}

#[test]
fn test_set_keeps_first_position() {
    let s = Set::new();
    s.new_error("A", &[]);
    s.new_error("B", &[]);
    s.add(Plain("A"));
    let composite = s.err().unwrap();
    assert_eq!(composite.to_string(), "A; B");
    assert!(composite.errors()[0].is::<Plain>());
}

#[test]
fn test_safe_list_across_threads() {
    let errs = SafeList::new();
    thread::scope(|s| {
        for worker in 0..8 {
            let errs = &errs;
            s.spawn(move || {
                errs.errorf("worker %d failed", &[&worker]);
                errs.new_error("shared failure", &[]);
            });
        }
    });
    assert_eq!(errs.len(), 16);
    let composite = errs.err().unwrap();
    assert!(is(&composite, &new("worker 3 failed", &[])));
    assert_eq!(composite.to_string().matches("shared failure").count(), 8);
}

#[test]
fn test_safe_set_across_threads() {
    let errs = SafeSet::new();
    thread::scope(|s| {
        for worker in 0..8 {
            let errs = errs.clone();
            s.spawn(move || {
                errs.errorf("worker %d failed", &[&worker]);
                errs.new_error("shared failure", &[]);
            });
        }
    });
    assert_eq!(errs.len(), 9);
    assert!(errs.has(&new("shared failure", &[])));

    // The composite can travel to another thread.
    let composite = errs.err().unwrap();
    let rendered = thread::spawn(move || composite.to_string()).join().unwrap();
    assert_eq!(rendered.matches("; ").count(), 8);
}

#[test]
fn test_plain_composites_become_causes() {
    fn validate(name: &str, age: i32) -> fielderr::Result<()> {
        let errs = List::new();
        if name.is_empty() {
            errs.new_error("name is empty", &[]);
        }
        if age < 0 {
            errs.new_error("age is negative", &[&"age", &age]);
        }
        match errs.err() {
            Some(view) => Err(view.into()),
            None => Ok(()),
        }
    }

    assert!(validate("bob", 3).is_ok());
    let err = wrap(validate("", -1).unwrap_err(), "loading user", &[]);
    assert_eq!(err.to_string(), "loading user: name is empty; age is negative age=-1");
    assert!(is(&err, &new("age is negative age=-1", &[])));
    assert!(!is(&err, &new("loading user", &[])));

    let set = Set::new();
    set.add(Plain("A"));
    let outer = SafeSet::new();
    outer.add(fielderr::Error::from(set.err().unwrap()));
    assert!(outer.has(&Plain("A")));
    assert_eq!(outer.err().unwrap().to_string(), "A");
}
