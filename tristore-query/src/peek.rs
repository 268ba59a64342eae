//! One-item lookahead over any cursor

use tristore_core::Cursor;

/// Cursor wrapper that can inspect the next item without consuming it
pub struct PeekableCursor<C: Cursor> {
    inner: C,
    peeked: Option<C::Item>,
}

impl<C: Cursor> PeekableCursor<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }

    /// Next item, left in place for the following `try_next`
    pub fn peek(&mut self) -> Result<Option<&C::Item>, C::Error> {
        if self.peeked.is_none() {
            self.peeked = self.inner.try_next()?;
        }
        Ok(self.peeked.as_ref())
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Cursor> Cursor for PeekableCursor<C> {
    type Item = C::Item;
    type Error = C::Error;

    fn try_next(&mut self) -> Result<Option<C::Item>, C::Error> {
        match self.peeked.take() {
            Some(item) => Ok(Some(item)),
            None => self.inner.try_next(),
        }
    }

    fn close(&mut self) -> Result<(), C::Error> {
        self.peeked = None;
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        next: u32,
        end: u32,
        closed: bool,
    }

    impl Cursor for Counter {
        type Item = u32;
        type Error = ();

        fn try_next(&mut self) -> Result<Option<u32>, ()> {
            if self.next >= self.end {
                return Ok(None);
            }
            self.next += 1;
            Ok(Some(self.next - 1))
        }

        fn close(&mut self) -> Result<(), ()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut c = PeekableCursor::new(Counter {
            next: 0,
            end: 2,
            closed: false,
        });
        assert_eq!(c.peek().unwrap(), Some(&0));
        assert_eq!(c.peek().unwrap(), Some(&0));
        assert_eq!(c.try_next().unwrap(), Some(0));
        assert_eq!(c.try_next().unwrap(), Some(1));
        assert_eq!(c.peek().unwrap(), None);
        assert_eq!(c.try_next().unwrap(), None);
    }

    #[test]
    fn test_close_drops_peeked() {
        let mut c = PeekableCursor::new(Counter {
            next: 0,
            end: 5,
            closed: false,
        });
        c.peek().unwrap();
        c.close().unwrap();
        assert!(c.into_inner().closed);
    }
}
