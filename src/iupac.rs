//! IUPAC ambiguity-code window expansion.

/// Expands an IUPAC nucleotide code to the concrete bases it represents.
/// Returns `None` for bytes outside the 15-symbol IUPAC alphabet (including
/// anything that isn't even a letter); such bytes trigger a hard window
/// reset rather than expansion.
fn expand_iupac(byte: u8) -> Option<&'static [u8]> {
    match byte.to_ascii_uppercase() {
        b'A' => Some(b"A"),
        b'C' => Some(b"C"),
        b'G' => Some(b"G"),
        b'T' => Some(b"T"),
        b'R' => Some(b"AG"),
        b'Y' => Some(b"CT"),
        b'S' => Some(b"GC"),
        b'W' => Some(b"AT"),
        b'K' => Some(b"GT"),
        b'M' => Some(b"AC"),
        b'B' => Some(b"CGT"),
        b'D' => Some(b"AGT"),
        b'H' => Some(b"ACT"),
        b'V' => Some(b"ACG"),
        b'N' => Some(b"ACGT"),
        _ => None,
    }
}

/// Outcome of feeding one more base into an [`IupacWindow`].
#[derive(Debug, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window has not yet reached `k` unambiguous-enough bases.
    Filling,
    /// A reset (unknown byte) or overflow (candidate cap exceeded) occurred;
    /// the window is being, or needs to be, refilled from scratch.
    Skipped,
    /// The window holds exactly `k` bases; `candidates` lists every
    /// concrete k-mer consistent with the ambiguity codes seen so far.
    Ready(Vec<Vec<u8>>),
}

/// Maintains the set of candidate k-mers consistent with the ambiguity
/// codes seen in a sliding window of width `k`, bounded by `max_iupac`.
pub struct IupacWindow {
    k: usize,
    max_iupac: usize,
    candidates: Vec<Vec<u8>>,
    /// After an overflow, only unambiguous (single-base) codes count
    /// towards refilling the window; `refill` tracks that run.
    refill: Vec<u8>,
    after_overflow: bool,
}

impl IupacWindow {
    /// Creates a new, empty window.
    pub fn new(k: usize, max_iupac: usize) -> Self {
        Self {
            k,
            max_iupac,
            candidates: Vec::new(),
            refill: Vec::new(),
            after_overflow: false,
        }
    }

    /// Feeds one more input character into the window.
    pub fn push(&mut self, byte: u8) -> WindowEvent {
        if self.after_overflow {
            return self.push_refill(byte);
        }

        let Some(bases) = expand_iupac(byte) else {
            self.candidates.clear();
            return WindowEvent::Skipped;
        };

        if self.candidates.is_empty() {
            self.candidates = bases.iter().map(|&b| vec![b]).collect();
        } else {
            let mut next = Vec::with_capacity(self.candidates.len() * bases.len());
            for cand in &self.candidates {
                for &b in bases {
                    let mut c = cand.clone();
                    if c.len() == self.k {
                        c.remove(0);
                    }
                    c.push(b);
                    next.push(c);
                }
            }
            self.candidates = next;
        }

        if self.candidates.len() > self.max_iupac {
            self.candidates.clear();
            self.after_overflow = true;
            self.refill.clear();
            return WindowEvent::Skipped;
        }

        if self.candidates[0].len() == self.k {
            WindowEvent::Ready(self.candidates.clone())
        } else {
            WindowEvent::Filling
        }
    }

    fn push_refill(&mut self, byte: u8) -> WindowEvent {
        match expand_iupac(byte) {
            Some([single]) => {
                self.refill.push(*single);
                if self.refill.len() > self.k {
                    self.refill.remove(0);
                }
                if self.refill.len() == self.k {
                    let window = self.refill.clone();
                    self.candidates = vec![window.clone()];
                    self.after_overflow = false;
                    WindowEvent::Ready(vec![window])
                } else {
                    WindowEvent::Filling
                }
            }
            _ => {
                self.refill.clear();
                WindowEvent::Skipped
            }
        }
    }
}
