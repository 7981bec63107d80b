const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const MAX_PENDING_BYTES: usize = 2 * 1024 * 1024;

/// Reassembles complete JPEG images from an arbitrarily chunked preview
/// byte stream. Bytes between frames (multipart boundaries, headers) are
/// discarded; the pending buffer is bounded.
pub struct FrameAssembler {
    pending: Vec<u8>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed the next chunk of the stream. Returns the newest complete frame
    /// contained in the buffered data, if any.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<Vec<u8>> {
        self.pending.extend_from_slice(chunk);
        if self.pending.len() > MAX_PENDING_BYTES {
            let excess = self.pending.len() - MAX_PENDING_BYTES;
            self.pending.drain(..excess);
        }

        let mut newest = None;
        while let Some(frame) = self.pop_frame() {
            newest = Some(frame);
        }
        newest
    }

    fn pop_frame(&mut self) -> Option<Vec<u8>> {
        let Some(start) = find(&self.pending, &SOI) else {
            // No frame start anywhere: nothing buffered is worth keeping.
            self.pending.clear();
            return None;
        };

        match find(&self.pending[start + SOI.len()..], &EOI) {
            Some(rel) => {
                let end = start + SOI.len() + rel + EOI.len();
                let frame = self.pending[start..end].to_vec();
                self.pending.drain(..end);
                Some(frame)
            }
            None => {
                // Partial frame: drop the junk before it and wait for more.
                self.pending.drain(..start);
                None
            }
        }
    }
}

fn find(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack.windows(marker.len()).position(|w| w == marker)
}
