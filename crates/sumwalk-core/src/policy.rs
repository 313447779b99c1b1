//! Worker-count policy.

/// Logical CPUs reported by the host.
pub fn available_parallelism() -> usize {
    num_cpus::get()
}

/// Default number of digest workers for a given hardware parallelism:
/// half of it, never fewer than one.
pub fn default_worker_count(parallelism: usize) -> usize {
    (parallelism / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_of_parallelism() {
        assert_eq!(default_worker_count(8), 4);
        assert_eq!(default_worker_count(16), 8);
        assert_eq!(default_worker_count(3), 1);
    }

    #[test]
    fn test_clamped_to_one() {
        assert_eq!(default_worker_count(1), 1);
        assert_eq!(default_worker_count(0), 1);
    }
}
