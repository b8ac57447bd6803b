use core::ffi::c_int;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    slice,
};

pub mod utilities;
use utilities::{
    backend::BackendKind,
    driver::{KmeansOptions, kmeans},
    reduce::EmptyClusterPolicy,
    structs::Point,
};

const OK: c_int = 0;
const ERR_INVALID_ARGS: c_int = 1;
const ERR_PANIC: c_int = 2;
const ERR_RUN: c_int = 3;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CRunOptions {
    pub iterations: u32,
    /// 0 sequential, 1 threaded, 2 gpu, 3 distributed.
    pub backend: u32,
    pub workers: u32,
    /// 0 freeze, anything else fail.
    pub fail_on_empty: c_int,
}

#[inline]
pub fn log_json<T: serde::Serialize>(v: &T) {
    if let Ok(s) = serde_json::to_string_pretty(v) {
        eprintln!("{s}");
    }
}

/// Runs the clustering loop on caller-owned buffers.
///
/// `centroids` (`class_n` points) is read as the initial state and
/// overwritten with the final one; `out_table` receives `data_n` cluster
/// indices. A null `options` means the defaults of `KmeansOptions`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lloyd_run(
    centroids_ptr: *mut Point,
    class_n: usize,
    data_ptr: *const Point,
    data_n: usize,
    options: *const CRunOptions,
    out_table: *mut i32,
) -> c_int {
    if centroids_ptr.is_null()
        || data_ptr.is_null()
        || out_table.is_null()
        || class_n == 0
        || data_n == 0
    {
        return ERR_INVALID_ARGS;
    }
    let opts = match build_options(options) {
        Some(o) => o,
        None => return ERR_INVALID_ARGS,
    };
    let res = catch_unwind(AssertUnwindSafe(|| -> Result<(), c_int> {
        let centroids = unsafe { slice::from_raw_parts_mut(centroids_ptr, class_n) };
        let data = unsafe { slice::from_raw_parts(data_ptr, data_n) };
        let table = unsafe { slice::from_raw_parts_mut(out_table, data_n) };
        let out = kmeans(data, centroids.to_vec(), &opts).map_err(|e| {
            tracing::error!(error = %e, "lloyd_run failed");
            ERR_RUN
        })?;
        centroids.copy_from_slice(&out.centroids);
        for (dst, &src) in table.iter_mut().zip(&out.table) {
            *dst = src as i32;
        }
        Ok(())
    }));
    match res {
        Ok(Ok(())) => OK,
        Ok(Err(code)) => code,
        Err(_) => ERR_PANIC,
    }
}

fn build_options(options: *const CRunOptions) -> Option<KmeansOptions> {
    if options.is_null() {
        return Some(KmeansOptions::default());
    }
    let o = unsafe { *options };
    Some(KmeansOptions {
        iterations: o.iterations as usize,
        backend: BackendKind::from_code(o.backend)?,
        workers: o.workers as usize,
        empty_cluster: if o.fail_on_empty != 0 {
            EmptyClusterPolicy::Fail
        } else {
            EmptyClusterPolicy::Freeze
        },
    })
}
