use cipc_codec::{Encode, Writer};

use crate::error::Result;

/// An argument list: values encoded back to back in declared order.
///
/// Implemented for tuples of up to eight [`Encode`] values (owned or
/// borrowed), including `()` for methods without arguments.
pub trait Args {
    /// Combined encoded size of all arguments.
    fn args_size(&self) -> usize;

    /// Encode every argument in order.
    fn encode_args(&self, writer: &mut Writer<'_>) -> Result<()>;
}

impl Args for () {
    fn args_size(&self) -> usize {
        0
    }

    fn encode_args(&self, _writer: &mut Writer<'_>) -> Result<()> {
        Ok(())
    }
}

macro_rules! tuple_args {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Encode),+> Args for ($($name,)+) {
            fn args_size(&self) -> usize {
                0 $(+ self.$idx.serialized_size())+
            }

            fn encode_args(&self, writer: &mut Writer<'_>) -> Result<()> {
                $(self.$idx.encode(writer)?;)+
                Ok(())
            }
        }
    };
}

tuple_args!(A.0);
tuple_args!(A.0, B.1);
tuple_args!(A.0, B.1, C.2);
tuple_args!(A.0, B.1, C.2, D.3);
tuple_args!(A.0, B.1, C.2, D.3, E.4);
tuple_args!(A.0, B.1, C.2, D.3, E.4, F.5);
tuple_args!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
tuple_args!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
