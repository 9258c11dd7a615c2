use crate::error::HandlerError;
use crate::exception::ExceptionCode;
use crate::types::{AddressRange, Operation, UnitId};

/// Data access behind the server, shared by every connection
///
/// A single instance is held for the lifetime of the [`Server`](crate::server::Server)
/// and may be invoked from several sessions at the same time, hence `&self` and
/// `Sync`. Implementations that own mutable state wrap it in a `Mutex` or similar.
///
/// Calls are made directly from the session task; a handler that blocks delays only
/// the session that invoked it.
///
/// Every method defaults to [`ExceptionCode::IllegalFunction`], so only the tables a
/// device actually has need to be implemented.
pub trait RequestHandler: Send + Sync + 'static {
    /// Read or write a block of coils
    ///
    /// Write single coil and write multiple coils both land here, the former with a
    /// range of count 1. For [`Operation::Read`] exactly `range.count` values must be
    /// returned in address order; the returned vector is ignored for writes.
    fn handle_coils(
        &self,
        _unit_id: UnitId,
        _range: AddressRange,
        _op: Operation<'_, bool>,
    ) -> Result<Vec<bool>, HandlerError> {
        Err(ExceptionCode::IllegalFunction.into())
    }

    /// Read a block of discrete inputs, exactly `range.count` values must be returned
    fn handle_discrete_inputs(
        &self,
        _unit_id: UnitId,
        _range: AddressRange,
    ) -> Result<Vec<bool>, HandlerError> {
        Err(ExceptionCode::IllegalFunction.into())
    }

    /// Read or write a block of holding registers
    ///
    /// Same contract as [`RequestHandler::handle_coils`]
    fn handle_holding_registers(
        &self,
        _unit_id: UnitId,
        _range: AddressRange,
        _op: Operation<'_, u16>,
    ) -> Result<Vec<u16>, HandlerError> {
        Err(ExceptionCode::IllegalFunction.into())
    }

    /// Read a block of input registers, exactly `range.count` values must be returned
    fn handle_input_registers(
        &self,
        _unit_id: UnitId,
        _range: AddressRange,
    ) -> Result<Vec<u16>, HandlerError> {
        Err(ExceptionCode::IllegalFunction.into())
    }
}

/// Retrieve the sub-slice of `slice` covered by `range`
///
/// Fails with [`ExceptionCode::IllegalDataAddress`] if the range extends past the end
/// of the slice, which is the usual answer for a table smaller than the address space.
pub fn get_range_of<T>(slice: &[T], range: AddressRange) -> Result<&[T], HandlerError> {
    slice
        .get(range.to_std_range())
        .ok_or(HandlerError::Exception(ExceptionCode::IllegalDataAddress))
}

/// Mutable counterpart of [`get_range_of`]
pub fn get_range_of_mut<T>(
    slice: &mut [T],
    range: AddressRange,
) -> Result<&mut [T], HandlerError> {
    slice
        .get_mut(range.to_std_range())
        .ok_or(HandlerError::Exception(ExceptionCode::IllegalDataAddress))
}
