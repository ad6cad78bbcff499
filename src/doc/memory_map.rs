/*!
# Memory Map

64K of flat RAM. The interesting addresses:

```text
$00A0-$00A2   jiffy clock, big-endian, 60 ticks per second.
              Free-running: the bytes synthesize themselves on read.
$00D3 (211)   cursor column consumed by sys 58640
$00D6 (214)   cursor row consumed by sys 58640
$0286 (646)   current text color
$0400-$07E7   screen characters, 40 columns by 25 rows of screencodes
$D018 (53272) charset select; bit 1 picks the shifted (lowercase) set
$D020 (53280) border color
$D021 (53281) background color
$D800-$DBE7   color RAM, one low nibble per screen cell
```

The device registers are ordinary memory with interceptors attached:
`poke 53280,2` turns the border red because a write hook at that
address updates the screen state, and `peek(160)` ticks because a read
hook computes the jiffy count on the way out. Everything else is plain
storage.

Kernal entry points recognized by `sys`:

```text
64738, 64760  hard reset
58640         position the cursor from locations 211/214
```

Any other target needs an attached CPU; without one the machine
reports `?no machine language support error`.
*/
