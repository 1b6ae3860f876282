//! Small prime helpers for double hashing and prime table capacities.

/// Trial division primality test, good enough for table-sized numbers.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// The smallest prime strictly greater than `n`.
pub fn next_prime(n: u64) -> u64 {
    let mut candidate = n + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// `n` itself if it is prime, otherwise the next prime after it.
pub fn prime_at_least(n: u64) -> u64 {
    if is_prime(n) { n } else { next_prime(n) }
}
