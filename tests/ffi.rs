use lloyd::utilities::structs::Point;
use lloyd::{CRunOptions, lloyd_run};

mod helpers;
use helpers::fixed_point_case;

#[test]
fn run_writes_caller_buffers() {
    let (data, mut cs) = fixed_point_case();
    let mut table = vec![-1i32; data.len()];
    let opts = CRunOptions {
        iterations: 2,
        backend: 1,
        workers: 2,
        fail_on_empty: 0,
    };
    let rc = unsafe {
        lloyd_run(
            cs.as_mut_ptr(),
            cs.len(),
            data.as_ptr(),
            data.len(),
            &opts,
            table.as_mut_ptr(),
        )
    };
    assert_eq!(rc, 0);
    assert_eq!(table, vec![0, 0, 1, 1]);
    assert_eq!(cs, vec![Point::new(0.0, 0.5), Point::new(10.0, 0.5)]);
}

#[test]
fn null_and_empty_inputs_are_rejected() {
    let (data, mut cs) = fixed_point_case();
    let mut table = vec![0i32; data.len()];
    let rc = unsafe {
        lloyd_run(
            cs.as_mut_ptr(),
            0,
            data.as_ptr(),
            data.len(),
            std::ptr::null(),
            table.as_mut_ptr(),
        )
    };
    assert_eq!(rc, 1);
    let rc = unsafe {
        lloyd_run(
            cs.as_mut_ptr(),
            cs.len(),
            std::ptr::null(),
            data.len(),
            std::ptr::null(),
            table.as_mut_ptr(),
        )
    };
    assert_eq!(rc, 1);
}

#[test]
fn unknown_backend_code_is_rejected() {
    let (data, mut cs) = fixed_point_case();
    let mut table = vec![0i32; data.len()];
    let opts = CRunOptions {
        iterations: 1,
        backend: 9,
        workers: 1,
        fail_on_empty: 0,
    };
    let rc = unsafe {
        lloyd_run(cs.as_mut_ptr(), cs.len(), data.as_ptr(), data.len(), &opts, table.as_mut_ptr())
    };
    assert_eq!(rc, 1);
}

#[test]
fn empty_cluster_failure_maps_to_run_error() {
    let data = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
    let mut cs = vec![Point::new(0.0, 0.0), Point::new(99.0, 99.0)];
    let before = cs.clone();
    let mut table = vec![0i32; data.len()];
    let opts = CRunOptions {
        iterations: 3,
        backend: 0,
        workers: 1,
        fail_on_empty: 1,
    };
    let rc = unsafe {
        lloyd_run(cs.as_mut_ptr(), cs.len(), data.as_ptr(), data.len(), &opts, table.as_mut_ptr())
    };
    assert_eq!(rc, 3);
    assert_eq!(cs, before);
}
