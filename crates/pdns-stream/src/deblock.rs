//! Record reassembly for newline-delimited streams.
//!
//! The network hands over bytes in arbitrary chunks; a [`Deblocker`] holds
//! them until a newline completes a record. At most one incomplete record
//! is ever buffered.

const NEWLINE: u8 = b'\n';

/// Per-fetch growable byte arena with push/consume operations.
#[derive(Debug, Default)]
pub struct Deblocker {
    buf: Vec<u8>,
    // Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl Deblocker {
    /// Creates an empty deblocker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
        }
    }

    /// Appends a freshly received chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete record, without its newline.
    pub fn next_record(&mut self) -> Option<Vec<u8>> {
        let unscanned = self.buf.get(self.scanned..)?;
        let Some(offset) = unscanned.iter().position(|byte| *byte == NEWLINE) else {
            self.scanned = self.buf.len();
            return None;
        };
        let end = self.scanned + offset;
        self.scanned = 0;
        let mut record: Vec<u8> = self.buf.drain(..=end).collect();
        record.pop();
        Some(record)
    }

    /// Bytes of the incomplete trailing record.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of buffered bytes not yet forming a complete record.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Drops everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }

    /// Discards the leftover bytes at end of stream and reports how many
    /// there were.
    pub fn strand(&mut self) -> usize {
        let stranded = self.buf.len();
        self.clear();
        self.buf.shrink_to_fit();
        stranded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const STREAM: &[u8] = b"{\"cond\":\"begin\"}\n{\"obj\":{\"rrname\":\"a.\"}}\n\n{\"cond\":\"succeeded\"}\ntrail";

    fn drain(deblocker: &mut Deblocker, sink: &mut Vec<Vec<u8>>) {
        while let Some(record) = deblocker.next_record() {
            sink.push(record);
        }
    }

    fn records_for(chunks: &[&[u8]]) -> (Vec<Vec<u8>>, usize) {
        let mut deblocker = Deblocker::new();
        let mut records = Vec::new();
        for chunk in chunks {
            deblocker.push(chunk);
            drain(&mut deblocker, &mut records);
        }
        (records, deblocker.pending_len())
    }

    #[test]
    fn many_records_in_one_chunk() {
        let (records, pending) = records_for(&[STREAM]);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0], b"{\"cond\":\"begin\"}".to_vec());
        assert!(records[2].is_empty());
        assert_eq!(pending, b"trail".len());
    }

    #[test]
    fn every_segmentation_yields_the_same_records() {
        let (expected, expected_pending) = records_for(&[STREAM]);
        for first in 0..=STREAM.len() {
            for second in first..=STREAM.len() {
                let chunks = [
                    &STREAM[..first],
                    &STREAM[first..second],
                    &STREAM[second..],
                ];
                let (records, pending) = records_for(&chunks);
                assert_eq!(records, expected, "split at {first}/{second}");
                assert_eq!(pending, expected_pending);
            }
        }
    }

    #[test]
    fn byte_at_a_time_delivery() {
        let chunks: Vec<&[u8]> = STREAM.chunks(1).collect();
        let (records, _) = records_for(&chunks);
        assert_eq!(records, records_for(&[STREAM]).0);
    }

    #[rstest]
    #[case(b"", 0)]
    #[case(b"partial", 0)]
    #[case(b"one\n", 1)]
    #[case(b"one\ntwo\nthree\n", 3)]
    fn counts_complete_records(#[case] chunk: &[u8], #[case] expected: usize) {
        assert_eq!(records_for(&[chunk]).0.len(), expected);
    }

    #[test]
    fn strand_reports_and_discards_leftovers() {
        let mut deblocker = Deblocker::new();
        deblocker.push(b"done\nhalf a rec");
        assert_eq!(deblocker.next_record(), Some(b"done".to_vec()));
        assert_eq!(deblocker.strand(), b"half a rec".len());
        assert_eq!(deblocker.pending_len(), 0);
        assert_eq!(deblocker.strand(), 0);
    }

    #[test]
    fn clear_forgets_scan_progress() {
        let mut deblocker = Deblocker::new();
        deblocker.push(b"no newline yet");
        assert!(deblocker.next_record().is_none());
        deblocker.clear();
        deblocker.push(b"x\n");
        assert_eq!(deblocker.next_record(), Some(b"x".to_vec()));
    }
}
