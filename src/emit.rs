//! Emitter façade.
//!
//! Read-only: renders filtered, ranked splits as TSV using a genome-index →
//! name resolver. NEWICK/NEXUS rendering is out of scope here and left to
//! external collaborators.

use std::io::{self, Write};

use crate::color::ColorRepr;
use crate::rank::RankedSplit;

/// Writes each retained split as one line: `<weight>\t<name_i>\t<name_j>...`,
/// in the order `splits` is given (callers pass already-ranked, already
/// -filtered splits), listing the names of genomes whose bit is set in the
/// split's canonical color.
///
/// # Errors
/// Propagates any I/O error from `writer`.
pub fn output_splits<C: ColorRepr>(
    writer: &mut impl Write,
    splits: &[RankedSplit<C>],
    names: &[String],
) -> io::Result<()> {
    for split in splits {
        write!(writer, "{}", split.weight)?;
        for &member in &split.color.members(names.len()) {
            write!(writer, "\t{}", names[member])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PackedColor;
    use crate::rank::SplitList;

    fn split(weight: f64, bits: u64, n: usize) -> RankedSplit<PackedColor> {
        let mut c = PackedColor::empty(n);
        for i in 0..n {
            if bits & (1 << i) != 0 {
                c.set(i);
            }
        }
        let mut sl = SplitList::new(1);
        sl.insert(weight, c);
        sl.into_sorted_vec().into_iter().next().unwrap()
    }

    #[test]
    fn renders_weight_and_member_names_tab_separated() {
        let names = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let splits = vec![split(10.0, 0b011, 3)];
        let mut buf = Vec::new();
        output_splits(&mut buf, &splits, &names).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "10\talpha\tbeta\n");
    }

    #[test]
    fn multiple_splits_render_in_given_order() {
        let names = vec!["a".to_string(), "b".to_string()];
        let splits = vec![split(5.0, 0b01, 2), split(9.0, 0b10, 2)];
        let mut buf = Vec::new();
        output_splits(&mut buf, &splits, &names).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "5\ta\n9\tb\n");
    }

    #[test]
    fn empty_split_list_renders_nothing() {
        let names: Vec<String> = vec![];
        let splits: Vec<RankedSplit<PackedColor>> = vec![];
        let mut buf = Vec::new();
        output_splits(&mut buf, &splits, &names).unwrap();
        assert!(buf.is_empty());
    }
}
