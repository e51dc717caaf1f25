//! Unified diff output for `--diff`.
//!
//! Import regrouping only ever touches one contiguous region per block, so a
//! single hunk spanning the first to the last differing line is enough.

const CONTEXT: usize = 3;

/// The `diff -u` line gofmt prints before each file's diff.
pub fn diff_command(path: &str) -> String {
    let path = path.replace('\\', "/");
    format!("diff -u {}.orig {}\n", path, path)
}

/// Generates a unified diff between `original` and `formatted`.
///
/// Returns an empty string when the texts are equal.
pub fn unified_diff(path: &str, original: &str, formatted: &str) -> String {
    if original == formatted {
        return String::new();
    }

    let old: Vec<&str> = original.split_inclusive('\n').collect();
    let new: Vec<&str> = formatted.split_inclusive('\n').collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(old.len().min(new.len()) - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    let start = prefix.saturating_sub(CONTEXT);
    let trailing = suffix.min(CONTEXT);
    let old_changed = old.len() - suffix;
    let new_changed = new.len() - suffix;

    let mut diff = String::new();
    diff.push_str(&format!("--- {}.orig\n", path));
    diff.push_str(&format!("+++ {}\n", path));
    diff.push_str(&format!(
        "@@ -{} +{} @@\n",
        hunk_range(start, old_changed + trailing - start),
        hunk_range(start, new_changed + trailing - start)
    ));

    for line in &old[start..prefix] {
        push_line(&mut diff, ' ', line);
    }
    for line in &old[prefix..old_changed] {
        push_line(&mut diff, '-', line);
    }
    for line in &new[prefix..new_changed] {
        push_line(&mut diff, '+', line);
    }
    for line in &old[old_changed..old_changed + trailing] {
        push_line(&mut diff, ' ', line);
    }

    diff
}

/// `start,len` in 1-based hunk notation. An empty range names the line
/// before it.
fn hunk_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

fn push_line(diff: &mut String, marker: char, line: &str) {
    diff.push(marker);
    diff.push_str(line);
    if !line.ends_with('\n') {
        diff.push_str("\n\\ No newline at end of file\n");
    }
}
