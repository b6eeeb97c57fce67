// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::{delay, i2c};

/// The fixed I²C address of the sensor.
pub const DEVICE_ADDRESS: u8 = 0x69;

/// The sensor has an 8-bit register address space.
pub const REGISTER_SPACE_LENGTH: usize = 0x100;

const RECENT_OPERATIONS_QUEUE_LENGTH: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// The given register range runs off the end of the register space.
    IllegalAccess(u8),

    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// The requested operation is not allowed.
    ///
    /// This covers things situations such as:
    /// * An empty write (no register address).
    /// * A combined write-read transaction that writes more than the register address.
    /// * A write-read transaction with a 0-length read.
    IllegalOperation,

    /// A failure was injected for this transaction.
    Injected,
}

/// A single transaction as seen by the mock bus.
///
/// Transactions are recorded when they are attempted, so an injected failure still shows up in
/// [`MockSensorBus::recent_operations`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum I2cOperation {
    /// A plain write, with the bytes following the register address.
    Write { register: u8, payload: Vec<u8> },
    /// A write of the register address followed by a repeated-start read.
    Read { register: u8, length: usize },
}

impl I2cOperation {
    pub fn register(&self) -> u8 {
        match self {
            I2cOperation::Write { register, .. } => *register,
            I2cOperation::Read { register, .. } => *register,
        }
    }
}

/// A fake AMG88xx on a fake I²C bus.
///
/// Clones share their state, so a test can keep one copy to inspect while the driver owns
/// another.
#[derive(Clone, Debug)]
pub struct MockSensorBus {
    i2c_address: u8,
    registers: Rc<RefCell<[u8; REGISTER_SPACE_LENGTH]>>,
    recent_operations: Rc<RefCell<VecDeque<I2cOperation>>>,
    /// Index of the next transaction, counted from the last call to `fail_operation`.
    operation_count: Rc<RefCell<usize>>,
    fail_at: Rc<RefCell<Option<usize>>>,
    fail_register: Rc<RefCell<Option<u8>>>,
}

impl MockSensorBus {
    pub fn new(i2c_address: u8) -> Self {
        Self {
            i2c_address,
            registers: Rc::new(RefCell::new([0u8; REGISTER_SPACE_LENGTH])),
            recent_operations: Rc::new(RefCell::new(VecDeque::new())),
            operation_count: Rc::new(RefCell::new(0)),
            fail_at: Rc::new(RefCell::new(None)),
            fail_register: Rc::new(RefCell::new(None)),
        }
    }

    /// Read a single register byte.
    pub fn register(&self, register: u8) -> u8 {
        self.registers.borrow()[register as usize]
    }

    /// Set a single register byte.
    pub fn set_register(&self, register: u8, value: u8) {
        self.registers.borrow_mut()[register as usize] = value;
    }

    /// Store a little-endian 16-bit sample at `register` and `register + 1`.
    pub fn set_sample(&self, register: u8, raw: u16) {
        let start = register as usize;
        self.registers.borrow_mut()[start..(start + 2)].copy_from_slice(&raw.to_le_bytes());
    }

    /// Store the ambient temperature sample.
    pub fn set_thermistor(&self, raw: u16) {
        self.set_sample(crate::THERMISTOR_LOW, raw);
    }

    /// Replace the pixel block with a new frame of raw samples.
    ///
    /// This simulates the sensor finishing a new frame.
    pub fn update_frame(&self, pixels: &[u16]) {
        let mut registers = self.registers.borrow_mut();
        let start = crate::PIXEL_BASE as usize;
        registers[start..]
            .chunks_exact_mut(2)
            .zip(pixels.iter())
            .for_each(|(bytes, raw)| bytes.copy_from_slice(&raw.to_le_bytes()));
    }

    /// Fail the `index`-th transaction from now (0 being the very next one).
    pub fn fail_operation(&self, index: usize) {
        *self.operation_count.borrow_mut() = 0;
        *self.fail_at.borrow_mut() = Some(index);
    }

    /// Fail every transaction that addresses `register`.
    pub fn fail_register(&self, register: u8) {
        *self.fail_register.borrow_mut() = Some(register);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        *self.fail_at.borrow_mut() = None;
        *self.fail_register.borrow_mut() = None;
    }

    /// Recently attempted operations, oldest first.
    pub fn recent_operations(&self) -> Ref<VecDeque<I2cOperation>> {
        self.recent_operations.borrow()
    }

    pub fn clear_recent_operations(&self) {
        self.recent_operations.borrow_mut().clear()
    }

    fn add_operation(&self, operation: I2cOperation) -> Result<(), MockError> {
        let register = operation.register();
        {
            let mut recent_ops = self.recent_operations.borrow_mut();
            recent_ops.push_back(operation);
            while recent_ops.len() > RECENT_OPERATIONS_QUEUE_LENGTH {
                recent_ops.pop_front();
            }
        }
        let mut count = self.operation_count.borrow_mut();
        let index = *count;
        *count += 1;
        if *self.fail_at.borrow() == Some(index) || *self.fail_register.borrow() == Some(register)
        {
            Err(MockError::Injected)
        } else {
            Ok(())
        }
    }

    fn check_range(register: u8, length: usize) -> Result<usize, MockError> {
        let start = register as usize;
        if start + length > REGISTER_SPACE_LENGTH {
            Err(MockError::IllegalAccess(register))
        } else {
            Ok(start)
        }
    }
}

impl i2c::Write for MockSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        let (register, payload) = bytes.split_first().ok_or(MockError::IllegalOperation)?;
        self.add_operation(I2cOperation::Write {
            register: *register,
            payload: payload.to_vec(),
        })?;
        // The sensor auto-increments the register address for each payload byte.
        let start = Self::check_range(*register, payload.len())?;
        self.registers.borrow_mut()[start..(start + payload.len())].copy_from_slice(payload);
        Ok(())
    }
}

impl i2c::WriteRead for MockSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        // Write-reads should only be writing the register address
        if write_buffer.len() != 1 || out_buffer.is_empty() {
            return Err(MockError::IllegalOperation);
        }
        let register = write_buffer[0];
        self.add_operation(I2cOperation::Read {
            register,
            length: out_buffer.len(),
        })?;
        let start = Self::check_range(register, out_buffer.len())?;
        out_buffer.copy_from_slice(&self.registers.borrow()[start..(start + out_buffer.len())]);
        Ok(())
    }
}

/// A delay that records how long it was asked to wait instead of waiting.
#[derive(Clone, Debug, Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u16>,
}

impl delay::DelayMs<u16> for RecordingDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.delays_ms.push(ms);
    }
}

/// A mock sensor at the default address, with the example frame and thermistor loaded.
pub fn example_amg8833() -> MockSensorBus {
    let bus = MockSensorBus::new(DEVICE_ADDRESS);
    bus.set_thermistor(crate::EXAMPLE_THERMISTOR_RAW);
    bus.update_frame(&crate::example_pixels_raw());
    bus
}
