//! Byte-level builders for synthetic Mach-O images and AFDT blobs

pub const MH_MAGIC: u32 = 0xfeed_face;
pub const MH_MAGIC_64: u32 = 0xfeed_facf;
pub const MH_EXECUTE: u32 = 0x2;
pub const LC_SEGMENT: u32 = 0x1;
pub const LC_SEGMENT_64: u32 = 0x19;
pub const LC_UNIXTHREAD: u32 = 0x5;

/// Assembles a Mach-O image: header, load commands, then payload bytes at
/// fixed file offsets.
pub struct MachOBuilder {
    is_64: bool,
    arm64_thread: bool,
    magic: Option<u32>,
    file_type: u32,
    commands_nb: Option<u32>,
    commands: Vec<Vec<u8>>,
    payloads: Vec<(usize, Vec<u8>)>,
}

#[allow(dead_code)]
impl MachOBuilder {
    pub fn new64() -> Self {
        Self::new(true)
    }

    pub fn new32() -> Self {
        Self::new(false)
    }

    fn new(is_64: bool) -> Self {
        Self {
            is_64,
            arm64_thread: false,
            magic: None,
            file_type: MH_EXECUTE,
            commands_nb: None,
            commands: Vec::new(),
            payloads: Vec::new(),
        }
    }

    /// Encode unix-thread commands with the full arm64 register block
    pub fn arm64_thread(mut self) -> Self {
        self.arm64_thread = true;
        self
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = Some(magic);
        self
    }

    pub fn file_type(mut self, file_type: u32) -> Self {
        self.file_type = file_type;
        self
    }

    /// Override the command count written into the header
    pub fn commands_nb(mut self, count: u32) -> Self {
        self.commands_nb = Some(count);
        self
    }

    pub fn header_size(&self) -> usize {
        if self.is_64 { 32 } else { 28 }
    }

    /// Offset the next command will be written at
    pub fn next_command_offset(&self) -> usize {
        self.header_size() + self.commands.iter().map(Vec::len).sum::<usize>()
    }

    pub fn segment(mut self, name: &str, dst: u64, dst_len: u64, src_offset: u64, src_len: u64) -> Self {
        let word = if self.is_64 { 8 } else { 4 };
        let size = 8 + 16 + 4 * word + 16;
        let mut cmd = Vec::with_capacity(size);

        let tag = if self.is_64 { LC_SEGMENT_64 } else { LC_SEGMENT };
        cmd.extend_from_slice(&tag.to_le_bytes());
        cmd.extend_from_slice(&(size as u32).to_le_bytes());

        let mut seg_name = [0u8; 16];
        seg_name[..name.len()].copy_from_slice(name.as_bytes());
        cmd.extend_from_slice(&seg_name);

        for value in [dst, dst_len, src_offset, src_len] {
            if self.is_64 {
                cmd.extend_from_slice(&value.to_le_bytes());
            } else {
                cmd.extend_from_slice(&(value as u32).to_le_bytes());
            }
        }

        // maxprot, initprot, nsects, flags
        for value in [7u32, 5, 0, 0] {
            cmd.extend_from_slice(&value.to_le_bytes());
        }

        self.commands.push(cmd);
        self
    }

    pub fn unix_thread(mut self, pc: u64) -> Self {
        let (flavor, state_size, pc_offset) = if self.arm64_thread {
            (6u32, 272usize, 256usize)
        } else {
            (1u32, 8usize, 0usize)
        };

        let size = 16 + state_size;
        let mut cmd = vec![0u8; size];
        cmd[0..4].copy_from_slice(&LC_UNIXTHREAD.to_le_bytes());
        cmd[4..8].copy_from_slice(&(size as u32).to_le_bytes());
        cmd[8..12].copy_from_slice(&flavor.to_le_bytes());
        cmd[12..16].copy_from_slice(&((state_size / 4) as u32).to_le_bytes());
        cmd[16 + pc_offset..16 + pc_offset + 8].copy_from_slice(&pc.to_le_bytes());

        self.commands.push(cmd);
        self
    }

    /// An arbitrary command the loader should skip by its declared size
    pub fn raw_command(mut self, tag: u32, size: u32, body_len: usize) -> Self {
        let mut cmd = vec![0xa5u8; 8 + body_len];
        cmd[0..4].copy_from_slice(&tag.to_le_bytes());
        cmd[4..8].copy_from_slice(&size.to_le_bytes());
        self.commands.push(cmd);
        self
    }

    /// Place `bytes` at file offset `offset`
    pub fn payload(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.payloads.push((offset, bytes.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut image = Vec::new();

        let magic = self
            .magic
            .unwrap_or(if self.is_64 { MH_MAGIC_64 } else { MH_MAGIC });
        let commands_len: usize = self.commands.iter().map(Vec::len).sum();
        let commands_nb = self.commands_nb.unwrap_or(self.commands.len() as u32);

        image.extend_from_slice(&magic.to_le_bytes());
        image.extend_from_slice(&0x0100_000cu32.to_le_bytes()); // CPU_TYPE_ARM64
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&self.file_type.to_le_bytes());
        image.extend_from_slice(&commands_nb.to_le_bytes());
        image.extend_from_slice(&(commands_len as u32).to_le_bytes());
        image.extend_from_slice(&1u32.to_le_bytes()); // MH_NOUNDEFS
        if self.is_64 {
            image.extend_from_slice(&0u32.to_le_bytes());
        }

        for cmd in &self.commands {
            image.extend_from_slice(cmd);
        }

        for (offset, bytes) in &self.payloads {
            let end = offset + bytes.len();
            if image.len() < end {
                image.resize(end, 0);
            }
            image[*offset..end].copy_from_slice(bytes);
        }

        image
    }
}

/// Assembles an AFDT node: properties first, then child nodes.
#[derive(Clone, Default)]
pub struct AfdtBuilder {
    properties: Vec<(String, Vec<u8>)>,
    children: Vec<AfdtBuilder>,
}

#[allow(dead_code)]
impl AfdtBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: &str, value: &[u8]) -> Self {
        self.properties.push((name.to_string(), value.to_vec()));
        self
    }

    pub fn child(mut self, child: AfdtBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(&(self.properties.len() as u32).to_le_bytes());
        blob.extend_from_slice(&(self.children.len() as u32).to_le_bytes());

        for (name, value) in &self.properties {
            let mut field = [0u8; 32];
            field[..name.len()].copy_from_slice(name.as_bytes());
            blob.extend_from_slice(&field);
            blob.extend_from_slice(&(value.len() as u32).to_le_bytes());
            blob.extend_from_slice(value);
            // Values are padded to 4 bytes
            while blob.len() % 4 != 0 {
                blob.push(0);
            }
        }

        for child in &self.children {
            blob.extend_from_slice(&child.build());
        }

        blob
    }
}
