//! ## Character screen
//!
//! Cursor, color, and scroll bookkeeping layered on the memory bus.
//! The screen and colors are memory-mapped: writing bytes at $0400 or
//! $D800 changes what a renderer sees, and the mode/color registers
//! are ordinary addresses with interceptors attached.

use super::charset;
use super::memory::{Memory, MEMORY_SIZE};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

pub const COLUMNS: usize = 40;
pub const ROWS: usize = 25;
pub const CELLS: usize = COLUMNS * ROWS;

pub const SCREEN_RAM: u16 = 0x0400;
pub const COLOR_RAM: u16 = 0xd800;

const TEXT_COLOR: u16 = 646;
const BORDER_COLOR: u16 = 53280;
const BACKGROUND_COLOR: u16 = 53281;
const CHARSET_SELECT: u16 = 53272;
const JIFFY_CLOCK: u16 = 160;

/// Jiffy clock rate.
pub const HZ: u64 = 60;

/// The fixed palette, 0xRRGGBB per color index.
pub const COLOR_PALETTE: [u32; 16] = [
    0x000000, // 0 = black
    0xFFFFFF, // 1 = white
    0x68372B, // 2 = red
    0x70A4B2, // 3 = cyan
    0x6F3D86, // 4 = purple
    0x588D43, // 5 = green
    0x352879, // 6 = blue
    0xB8C76F, // 7 = yellow
    0x6F4F25, // 8 = orange
    0x433900, // 9 = brown
    0x9A6759, // 10 = light red
    0x444444, // 11 = dark grey
    0x6C6C6C, // 12 = medium grey
    0x9AD284, // 13 = light green
    0x6C5EB5, // 14 = light blue
    0x959595, // 15 = light grey
];

// Register state shared with the bus interceptors.
struct Regs {
    text: u8,
    border: u8,
    background: u8,
    shifted: bool,
    full_repaint: bool,
}

/// A rectangular sub-region of the screen, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Region {
    pub fn full() -> Region {
        Region {
            x1: 0,
            y1: 0,
            x2: COLUMNS - 1,
            y2: ROWS - 1,
        }
    }
}

/// Scroll directions; any combination may be set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

pub struct Screen {
    mem: Memory,
    regs: Rc<RefCell<Regs>>,
    cursor: usize,
    cursor_state: bool,
    cursor_enabled: bool,
    inverse: bool,
    prev_chars: Vec<u8>,
    prev_colors: Vec<u8>,
}

impl Screen {
    pub fn new() -> Screen {
        let regs = Rc::new(RefCell::new(Regs {
            text: 14,
            border: 14,
            background: 6,
            shifted: false,
            full_repaint: true,
        }));
        let mut mem = Memory::new(MEMORY_SIZE);
        Screen::install_register_hooks(&mut mem, &regs);
        Screen::install_clock_hooks(&mut mem);
        let mut screen = Screen {
            mem,
            regs,
            cursor: 0,
            cursor_state: false,
            cursor_enabled: true,
            inverse: false,
            prev_chars: vec![0; CELLS],
            prev_colors: vec![0; CELLS],
        };
        screen.clear();
        screen
    }

    fn install_register_hooks(mem: &mut Memory, regs: &Rc<RefCell<Regs>>) {
        let r = regs.clone();
        mem.intercept_write(TEXT_COLOR, Box::new(move |_, _, new| {
            r.borrow_mut().text = new & 0x0f;
            None
        }));
        let r = regs.clone();
        mem.intercept_read(TEXT_COLOR, Box::new(move |_, _| Some(r.borrow().text)));
        let r = regs.clone();
        mem.intercept_write(BORDER_COLOR, Box::new(move |_, _, new| {
            r.borrow_mut().border = new & 0x0f;
            None
        }));
        let r = regs.clone();
        mem.intercept_read(BORDER_COLOR, Box::new(move |_, _| Some(r.borrow().border)));
        let r = regs.clone();
        mem.intercept_write(BACKGROUND_COLOR, Box::new(move |_, _, new| {
            let mut regs = r.borrow_mut();
            regs.background = new & 0x0f;
            regs.full_repaint = true;
            None
        }));
        let r = regs.clone();
        mem.intercept_read(BACKGROUND_COLOR, Box::new(move |_, _| {
            Some(r.borrow().background)
        }));
        let r = regs.clone();
        mem.intercept_write(CHARSET_SELECT, Box::new(move |_, _, new| {
            let mut regs = r.borrow_mut();
            let shifted = new & 2 != 0;
            regs.full_repaint |= shifted != regs.shifted;
            regs.shifted = shifted;
            None
        }));
        let r = regs.clone();
        mem.intercept_read(CHARSET_SELECT, Box::new(move |_, _| {
            Some(if r.borrow().shifted { 23 } else { 21 })
        }));
    }

    // The jiffy clock at $A0-$A2 free-runs: reading any of its three
    // bytes synthesizes the current tick count.
    fn install_clock_hooks(mem: &mut Memory) {
        let epoch = Instant::now();
        for &(i, shift) in [(0u16, 16u32), (1, 8), (2, 0)].iter() {
            mem.intercept_read(JIFFY_CLOCK + i, Box::new(move |_, _| {
                let jiffies = (epoch.elapsed().as_secs_f64() * HZ as f64) as u64;
                Some(((jiffies >> shift) & 0xff) as u8)
            }));
        }
    }

    pub fn memory(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn text(&self) -> u8 {
        self.regs.borrow().text
    }

    pub fn border(&self) -> u8 {
        self.regs.borrow().border
    }

    pub fn background(&self) -> u8 {
        self.regs.borrow().background
    }

    pub fn shifted(&self) -> bool {
        self.regs.borrow().shifted
    }

    pub fn set_text(&mut self, color: u8) {
        self.regs.borrow_mut().text = color & 0x0f;
    }

    pub fn set_border(&mut self, color: u8) {
        self.regs.borrow_mut().border = color & 0x0f;
    }

    pub fn set_background(&mut self, color: u8) {
        let mut regs = self.regs.borrow_mut();
        regs.background = color & 0x0f;
        regs.full_repaint = true;
    }

    pub fn set_shifted(&mut self, shifted: bool) {
        let mut regs = self.regs.borrow_mut();
        regs.full_repaint |= shifted != regs.shifted;
        regs.shifted = shifted;
    }

    pub fn cursor_enabled(&self) -> bool {
        self.cursor_enabled
    }

    pub fn set_cursor_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.fix_cursor(false);
        }
        self.cursor_enabled = enabled;
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_enabled && self.cursor_state
    }

    /// Write ASCII text to the screen.
    pub fn writestr(&mut self, text: &str) {
        let petscii: Vec<u8> = text.chars().filter_map(charset::ascii_to_petscii).collect();
        self.write(&petscii);
    }

    /// Write PETSCII to the screen, control codes included.
    pub fn write(&mut self, petscii: &[u8]) {
        self.fix_cursor(false);
        let prev_cursor_enabled = self.cursor_enabled;
        self.cursor_enabled = false;
        for &c in petscii {
            let c = if c == 0x8d { 0x0d } else { c }; // shift-RETURN
            if Screen::is_unprintable(c) {
                continue;
            }
            if !self.handle_control(c) {
                let code = charset::petscii_to_screen(c, self.inverse);
                let text = self.text();
                self.mem.write(SCREEN_RAM + self.cursor as u16, code);
                self.mem.write(COLOR_RAM + self.cursor as u16, text);
                self.cursor += 1;
                if self.cursor >= CELLS {
                    self.scroll_up_full();
                    self.cursor = CELLS - COLUMNS;
                }
            }
        }
        self.cursor_enabled = prev_cursor_enabled;
        self.fix_cursor(true);
    }

    fn is_unprintable(c: u8) -> bool {
        match c {
            0x00..=0x04 | 0x06..=0x0c | 0x0f | 0x10 | 0x15..=0x1b => true,
            0x80 | 0x82..=0x8c | 0x8f => true,
            _ => false,
        }
    }

    fn handle_control(&mut self, c: u8) -> bool {
        let text_color = match c {
            0x05 => Some(1),  // white
            0x1c => Some(2),  // red
            0x1e => Some(5),  // green
            0x1f => Some(6),  // blue
            0x81 => Some(8),  // orange
            0x90 => Some(0),  // black
            0x95 => Some(9),  // brown
            0x96 => Some(10), // pink
            0x97 => Some(11), // dark grey
            0x98 => Some(12), // grey
            0x99 => Some(13), // light green
            0x9a => Some(14), // light blue
            0x9b => Some(14), // light grey
            0x9c => Some(4),  // purple
            0x9e => Some(7),  // yellow
            0x9f => Some(3),  // cyan
            _ => None,
        };
        if let Some(color) = text_color {
            self.set_text(color);
            return true;
        }
        match c {
            0x0d => {
                // RETURN, go to next line
                self.cursor = COLUMNS * (1 + self.cursor / COLUMNS);
                if self.cursor > CELLS - COLUMNS {
                    self.scroll_up_full();
                    self.cursor = CELLS - COLUMNS;
                }
            }
            0x0e => self.set_shifted(true),
            0x8e => self.set_shifted(false),
            0x11 => self.down(),
            0x91 => self.up(),
            0x1d => self.right(),
            0x9d => self.left(),
            0x12 => self.inverse = true,
            0x92 => self.inverse = false,
            0x13 => self.cursor_move(0, 0),
            0x14 => self.backspace(),
            0x94 => self.insert(),
            0x93 => self.clear(),
            _ => return false,
        }
        true
    }

    fn fix_cursor(&mut self, on: bool) {
        if on && !self.cursor_enabled {
            return;
        }
        let addr = SCREEN_RAM + self.cursor as u16;
        if !on && self.cursor_state {
            let code = self.mem.read(addr);
            self.mem.write(addr, code & 0x7f);
            let text = self.text();
            self.mem.write(COLOR_RAM + self.cursor as u16, text);
        }
        if on && !self.cursor_state {
            let code = self.mem.read(addr);
            self.mem.write(addr, code | 0x80);
            let text = self.text();
            self.mem.write(COLOR_RAM + self.cursor as u16, text);
        }
        self.cursor_state = on;
    }

    pub fn blink_cursor(&mut self) {
        if self.cursor_enabled {
            self.cursor_state = !self.cursor_state;
            let addr = SCREEN_RAM + self.cursor as u16;
            let code = self.mem.read(addr);
            self.mem.write(addr, code ^ 0x80);
            let text = self.text();
            self.mem.write(COLOR_RAM + self.cursor as u16, text);
        }
    }

    fn fill(&self, fill: (u8, Option<u8>)) -> (u8, u8) {
        (fill.0, fill.1.unwrap_or_else(|| self.text()))
    }

    fn scroll_up_full(&mut self) {
        self.scroll_region_up(Region::full(), (32, None));
    }

    fn scroll_region_up(&mut self, r: Region, fill: (u8, Option<u8>)) {
        let (fillchar, fillcolor) = self.fill(fill);
        let width = r.x2 - r.x1 + 1;
        if width == COLUMNS {
            // full-width region moves as one block
            let src = (r.y1 + 1) * COLUMNS;
            let len = (r.y2 - r.y1) * COLUMNS;
            let chars = self.mem.read_range(SCREEN_RAM + src as u16, len);
            let colors = self.mem.read_range(COLOR_RAM + src as u16, len);
            let dst = r.y1 * COLUMNS;
            self.mem.write_range(SCREEN_RAM + dst as u16, &chars);
            self.mem.write_range(COLOR_RAM + dst as u16, &colors);
        } else {
            for y in r.y1..r.y2 {
                let src = (y + 1) * COLUMNS + r.x1;
                let dst = y * COLUMNS + r.x1;
                let chars = self.mem.read_range(SCREEN_RAM + src as u16, width);
                let colors = self.mem.read_range(COLOR_RAM + src as u16, width);
                self.mem.write_range(SCREEN_RAM + dst as u16, &chars);
                self.mem.write_range(COLOR_RAM + dst as u16, &colors);
            }
        }
        let last = r.y2 * COLUMNS + r.x1;
        self.mem.fill_range(SCREEN_RAM + last as u16, width, fillchar);
        self.mem.fill_range(COLOR_RAM + last as u16, width, fillcolor);
    }

    fn scroll_region_down(&mut self, r: Region, fill: (u8, Option<u8>)) {
        let (fillchar, fillcolor) = self.fill(fill);
        let width = r.x2 - r.x1 + 1;
        if width == COLUMNS {
            let src = r.y1 * COLUMNS;
            let len = (r.y2 - r.y1) * COLUMNS;
            let chars = self.mem.read_range(SCREEN_RAM + src as u16, len);
            let colors = self.mem.read_range(COLOR_RAM + src as u16, len);
            let dst = (r.y1 + 1) * COLUMNS;
            self.mem.write_range(SCREEN_RAM + dst as u16, &chars);
            self.mem.write_range(COLOR_RAM + dst as u16, &colors);
        } else {
            for y in (r.y1..r.y2).rev() {
                let src = y * COLUMNS + r.x1;
                let dst = (y + 1) * COLUMNS + r.x1;
                let chars = self.mem.read_range(SCREEN_RAM + src as u16, width);
                let colors = self.mem.read_range(COLOR_RAM + src as u16, width);
                self.mem.write_range(SCREEN_RAM + dst as u16, &chars);
                self.mem.write_range(COLOR_RAM + dst as u16, &colors);
            }
        }
        let first = r.y1 * COLUMNS + r.x1;
        self.mem.fill_range(SCREEN_RAM + first as u16, width, fillchar);
        self.mem.fill_range(COLOR_RAM + first as u16, width, fillcolor);
    }

    fn scroll_region_left(&mut self, r: Region, fill: (u8, Option<u8>)) {
        let (fillchar, fillcolor) = self.fill(fill);
        let width = r.x2 - r.x1 + 1;
        for y in r.y1..=r.y2 {
            let base = y * COLUMNS + r.x1;
            let row = self.mem.read_range(SCREEN_RAM + base as u16 + 1, width - 1);
            let colors = self.mem.read_range(COLOR_RAM + base as u16 + 1, width - 1);
            self.mem.write_range(SCREEN_RAM + base as u16, &row);
            self.mem.write_range(COLOR_RAM + base as u16, &colors);
            let last = (y * COLUMNS + r.x2) as u16;
            self.mem.write(SCREEN_RAM + last, fillchar);
            self.mem.write(COLOR_RAM + last, fillcolor);
        }
    }

    fn scroll_region_right(&mut self, r: Region, fill: (u8, Option<u8>)) {
        let (fillchar, fillcolor) = self.fill(fill);
        let width = r.x2 - r.x1 + 1;
        for y in r.y1..=r.y2 {
            let base = y * COLUMNS + r.x1;
            let row = self.mem.read_range(SCREEN_RAM + base as u16, width - 1);
            let colors = self.mem.read_range(COLOR_RAM + base as u16, width - 1);
            self.mem.write_range(SCREEN_RAM + base as u16 + 1, &row);
            self.mem.write_range(COLOR_RAM + base as u16 + 1, &colors);
            let first = base as u16;
            self.mem.write(SCREEN_RAM + first, fillchar);
            self.mem.write(COLOR_RAM + first, fillcolor);
        }
    }

    /// Scroll a sub-region one cell per direction, `amount` times.
    /// The region must already be clamped to the screen bounds.
    pub fn scroll(
        &mut self,
        region: Region,
        dirs: Directions,
        fill: (u8, Option<u8>),
        amount: usize,
    ) {
        debug_assert!(region.x1 <= region.x2 && region.x2 < COLUMNS);
        debug_assert!(region.y1 <= region.y2 && region.y2 < ROWS);
        self.fix_cursor(false);
        for _ in 0..amount {
            if dirs.up {
                self.scroll_region_up(region, fill);
            }
            if dirs.down {
                self.scroll_region_down(region, fill);
            }
            if dirs.left {
                self.scroll_region_left(region, fill);
            }
            if dirs.right {
                self.scroll_region_right(region, fill);
            }
        }
        self.fix_cursor(true);
    }

    pub fn return_key(&mut self) {
        self.fix_cursor(false);
        self.cursor = COLUMNS * (self.cursor / COLUMNS) + COLUMNS;
        if self.cursor >= CELLS {
            self.scroll_up_full();
            self.cursor -= COLUMNS;
        }
        self.fix_cursor(true);
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.fix_cursor(false);
            self.cursor -= 1;
            let end = COLUMNS * (self.cursor / COLUMNS) + COLUMNS - 1;
            let len = end - self.cursor;
            if len > 0 {
                let chars = self.mem.read_range(SCREEN_RAM + self.cursor as u16 + 1, len);
                let colors = self.mem.read_range(COLOR_RAM + self.cursor as u16 + 1, len);
                self.mem.write_range(SCREEN_RAM + self.cursor as u16, &chars);
                self.mem.write_range(COLOR_RAM + self.cursor as u16, &colors);
            }
            let text = self.text();
            self.mem.write(SCREEN_RAM + end as u16, 32);
            self.mem.write(COLOR_RAM + end as u16, text);
            self.fix_cursor(true);
        }
    }

    pub fn insert(&mut self) {
        if self.cursor < CELLS - 1 {
            self.fix_cursor(false);
            let end = COLUMNS * (self.cursor / COLUMNS) + COLUMNS;
            let len = end - self.cursor - 1;
            if len > 0 {
                let chars = self.mem.read_range(SCREEN_RAM + self.cursor as u16, len);
                let colors = self.mem.read_range(COLOR_RAM + self.cursor as u16, len);
                self.mem.write_range(SCREEN_RAM + self.cursor as u16 + 1, &chars);
                self.mem.write_range(COLOR_RAM + self.cursor as u16 + 1, &colors);
            }
            let text = self.text();
            self.mem.write(SCREEN_RAM + self.cursor as u16, 32);
            self.mem.write(COLOR_RAM + self.cursor as u16, text);
            self.fix_cursor(true);
        }
    }

    pub fn up(&mut self) {
        self.fix_cursor(false);
        if self.cursor < COLUMNS {
            self.scroll_region_down(Region::full(), (32, None));
        } else {
            self.cursor -= COLUMNS;
        }
        self.fix_cursor(true);
    }

    pub fn down(&mut self) {
        self.fix_cursor(false);
        if self.cursor >= CELLS - COLUMNS {
            self.scroll_up_full();
        } else {
            self.cursor += COLUMNS;
        }
        self.fix_cursor(true);
    }

    pub fn left(&mut self) {
        if self.cursor > 0 {
            self.fix_cursor(false);
            self.cursor -= 1;
            self.fix_cursor(true);
        }
    }

    pub fn right(&mut self) {
        if self.cursor < CELLS - 1 {
            self.fix_cursor(false);
            self.cursor += 1;
            self.fix_cursor(true);
        }
    }

    pub fn clear(&mut self) {
        let text = self.text();
        self.cursor_state = false;
        self.mem.fill_range(SCREEN_RAM, CELLS, 32);
        self.mem.fill_range(COLOR_RAM, CELLS, text);
        self.cursor = 0;
        self.fix_cursor(true);
    }

    pub fn cursor_move(&mut self, x: usize, y: usize) {
        self.fix_cursor(false);
        self.cursor = (x + COLUMNS * y).min(CELLS - 1);
        self.fix_cursor(true);
    }

    pub fn cursor_pos(&self) -> (usize, usize) {
        (self.cursor % COLUMNS, self.cursor / COLUMNS)
    }

    /// The character and color at one cell.
    pub fn char_at(&mut self, x: usize, y: usize) -> (u8, u8) {
        debug_assert!(x < COLUMNS && y < ROWS);
        let offset = (x + y * COLUMNS) as u16;
        (self.mem.read(SCREEN_RAM + offset), self.mem.read(COLOR_RAM + offset))
    }

    /// The text of the row under the cursor, read back as ASCII.
    pub fn current_line(&mut self) -> String {
        let start = SCREEN_RAM + (COLUMNS * (self.cursor / COLUMNS)) as u16;
        self.fix_cursor(false);
        let codes = self.mem.read_range(start, COLUMNS);
        self.fix_cursor(false);
        codes.iter().map(|&c| charset::screen_to_ascii(c)).collect()
    }

    /// One screen row as ASCII, NULs shown as spaces.
    pub fn row_text(&mut self, y: usize) -> String {
        let start = SCREEN_RAM + (y * COLUMNS) as u16;
        let codes = self.mem.read_range(start, COLUMNS);
        codes
            .iter()
            .map(|&c| match charset::screen_to_ascii(c & 0x7f) {
                '\u{0}' => ' ',
                ch => ch,
            })
            .collect()
    }

    /// Cells changed since the previous call, as (offset, screencode,
    /// color index). A pending full repaint reports every cell once.
    pub fn dirty_cells(&mut self) -> Vec<(usize, u8, u8)> {
        let chars = self.mem.read_range(SCREEN_RAM, CELLS);
        let colors = self.mem.read_range(COLOR_RAM, CELLS);
        let full_repaint = {
            let mut regs = self.regs.borrow_mut();
            std::mem::replace(&mut regs.full_repaint, false)
        };
        let result: Vec<(usize, u8, u8)> = if full_repaint {
            (0..CELLS).map(|i| (i, chars[i], colors[i])).collect()
        } else {
            (0..CELLS)
                .filter(|&i| chars[i] != self.prev_chars[i] || colors[i] != self.prev_colors[i])
                .map(|i| (i, chars[i], colors[i]))
                .collect()
        };
        if !result.is_empty() {
            self.prev_chars = chars;
            self.prev_colors = colors;
        }
        result
    }
}

impl Default for Screen {
    fn default() -> Screen {
        Screen::new()
    }
}
