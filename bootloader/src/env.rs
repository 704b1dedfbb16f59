// Firmware environment access

use heapless::Vec;

/// Read-only view of the firmware environment variables
pub trait Environment {
    /// Value of `name`, if set
    fn get(&self, name: &str) -> Option<&str>;
}

/// Fixed-capacity environment built at startup.
///
/// Later `set` calls replace earlier values of the same name.
#[derive(Debug, Default)]
pub struct EnvTable<'a, const N: usize> {
    vars: Vec<(&'a str, &'a str), N>,
}

impl<'a, const N: usize> EnvTable<'a, N> {
    pub const fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set `name` to `value`, handing the pair back when the table is full
    pub fn set(&mut self, name: &'a str, value: &'a str) -> Result<(), (&'a str, &'a str)> {
        if let Some(slot) = self.vars.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
            return Ok(());
        }
        self.vars.push((name, value))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<const N: usize> Environment for EnvTable<'_, N> {
    fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| *value)
    }
}
