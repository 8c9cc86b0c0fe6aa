//! Natural ordering for file names ("img2" sorts before "img10").

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings treating runs of ASCII digits as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let lrun = take_digits(&mut left);
                let rrun = take_digits(&mut right);
                let ord = cmp_digit_runs(&lrun, &rrun);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Sort any list of string-like values in natural order.
pub fn natsorted<T: AsRef<str>>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
    items
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        // "01" after "1" so the order stays total
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_compare_numerically() {
        assert_eq!(natural_cmp("img2.png", "img10.png"), Ordering::Less);
        assert_eq!(natural_cmp("img10.png", "img9.png"), Ordering::Greater);
        assert_eq!(natural_cmp("a1b2", "a1b2"), Ordering::Equal);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("run", "run1"), Ordering::Less);
    }

    #[test]
    fn leading_zeros_are_tie_broken() {
        assert_eq!(natural_cmp("x01", "x1"), Ordering::Greater);
        assert_eq!(natural_cmp("x001", "x2"), Ordering::Less);
    }

    #[test]
    fn natsorted_orders_mixed_names() {
        let sorted = natsorted(vec!["s10", "s2", "s1", "a"]);
        assert_eq!(sorted, vec!["a", "s1", "s2", "s10"]);
    }
}
