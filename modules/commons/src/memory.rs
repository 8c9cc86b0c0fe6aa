//! Memory usage probes for the current process and individual values.

use std::collections::{BTreeMap, HashMap};
use sysinfo::{ProcessesToUpdate, System};
use tracing::info;

/// Resident memory of the current process in MB.
pub fn process_memory_mb() -> Option<f64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    let process = system.process(pid)?;
    Some(process.memory() as f64 / 1024.0 / 1024.0)
}

/// Log the total memory usage of the current process.
pub fn log_memory(tag: &str) -> Option<f64> {
    let mem_in_mb = process_memory_mb()?;
    info!("{} Memory usage: {:.2} MB", tag, mem_in_mb);
    Some(mem_in_mb)
}

/// Heap bytes owned by a value, not counting the value itself.
pub trait HeapSize {
    fn heap_size(&self) -> usize;
}

macro_rules! no_heap {
    ($($t:ty),*) => {
        $(impl HeapSize for $t {
            fn heap_size(&self) -> usize {
                0
            }
        })*
    };
}

no_heap!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, ());

impl HeapSize for str {
    fn heap_size(&self) -> usize {
        0
    }
}

impl HeapSize for String {
    fn heap_size(&self) -> usize {
        self.capacity()
    }
}

impl<T: HeapSize> HeapSize for [T] {
    fn heap_size(&self) -> usize {
        self.iter().map(HeapSize::heap_size).sum()
    }
}

impl<T: HeapSize> HeapSize for Vec<T> {
    fn heap_size(&self) -> usize {
        self.capacity() * std::mem::size_of::<T>() + self.as_slice().heap_size()
    }
}

impl<T: HeapSize> HeapSize for Option<T> {
    fn heap_size(&self) -> usize {
        self.as_ref().map_or(0, HeapSize::heap_size)
    }
}

impl<T: HeapSize + ?Sized> HeapSize for Box<T> {
    fn heap_size(&self) -> usize {
        std::mem::size_of_val(&**self) + (**self).heap_size()
    }
}

impl<T: HeapSize + ?Sized> HeapSize for &T {
    fn heap_size(&self) -> usize {
        (**self).heap_size()
    }
}

impl<K: HeapSize, V: HeapSize, S> HeapSize for HashMap<K, V, S> {
    fn heap_size(&self) -> usize {
        self.capacity() * (std::mem::size_of::<K>() + std::mem::size_of::<V>())
            + self.iter().map(|(k, v)| k.heap_size() + v.heap_size()).sum::<usize>()
    }
}

impl<K: HeapSize, V: HeapSize> HeapSize for BTreeMap<K, V> {
    fn heap_size(&self) -> usize {
        self.iter()
            .map(|(k, v)| {
                std::mem::size_of::<K>() + std::mem::size_of::<V>() + k.heap_size() + v.heap_size()
            })
            .sum()
    }
}

/// Size of a single value in bytes, logged in KB.
///
/// Shallow size is the inline size of the value; deep adds the heap it owns.
pub fn sizeof<T: HeapSize + ?Sized>(var: &T, name: Option<&str>, deep: bool) -> usize {
    let label = name.unwrap_or_else(|| std::any::type_name::<T>());
    let mut size = std::mem::size_of_val(var);
    if deep {
        size += var.heap_size();
    }

    info!(
        "{}: {:.2} KB ({})",
        label,
        size as f64 / 1024.0,
        if deep { "deep" } else { "shallow" }
    );
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_size_counts_heap() {
        let v: Vec<u64> = Vec::with_capacity(16);
        let shallow = sizeof(&v, Some("v"), false);
        let deep = sizeof(&v, Some("v"), true);
        assert_eq!(shallow, std::mem::size_of::<Vec<u64>>());
        assert_eq!(deep, shallow + 16 * 8);
    }

    #[test]
    fn nested_strings_are_counted() {
        let names = vec![String::from("alpha"), String::from("beta")];
        let heap = names.heap_size();
        assert!(heap >= 2 * std::mem::size_of::<String>() + 9);
    }

    #[test]
    fn process_memory_is_reported() {
        if let Some(mb) = process_memory_mb() {
            assert!(mb > 0.0);
        }
    }
}
