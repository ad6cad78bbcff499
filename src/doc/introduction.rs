/*!
# Introduction

retro64 emulates the character-mode heart of an 8-bit home computer.
Everything the machine shows you lives in its own memory: screen
characters at $0400, their colors at $D800, the border and background
registers up at $D020/$D021. Poke those addresses and the display
changes; that is not a metaphor, it is the implementation.

On top of the memory sits a BASIC dialect. It is deliberately small
and deliberately non-blocking: a running program advances one line per
tick of the host loop, `SLEEP` is a polled deadline rather than a
pause, and RUN/STOP always gets the machine back within a tick.

## The dialect

Statements, with their classic abbreviations in parentheses:

```text
?expr            print (also PRINT)       cls          clear the screen
x = expr         assignment               color b,s,t  border/screen/text
poke a,v (pO)    write a byte             cursor x,y   place the cursor
pokew a,v        write a word             scroll d,... move a screen region
goto n (gO)      jump                     sleep s (sL) pause up to 60s
on i goto a,b    computed jump            for/next     loops (fO/nE)
if c then ...    conditional
read v (rE)      next DATA item           data ... (dA)
restore (reS)    rewind the data cursor   rem/#        comment
run [n] (rU)     start the program        list [a-b]   show it (lI)
new (nI)        erase it                  save "f" (sA)
load "f" (lO)   also http(s) URLs         sys a (sY)   call machine code
end (eN)/stop (sT)                        help         list all of these
```

Expressions are the usual arithmetic (`^ * / % + -`), comparisons
(`= <> < <= > >=`), and `and`/`or`/`xor`/`not`, over integers, floats,
and strings. Numbers write as decimal, `$d020` hex, or `%1011` binary.
Built-in functions: `peek peekw rnd rndi abs int sgn sqrt log exp sin
cos tan atn len asc chr str val crc32`, plus the constants `pi` and
`e`, the jiffy clock `ti`, and the wall clock `time`.

## Example

```text
10 color 0,0,1
20 for i = 0 to 15
30 poke 53280, i
40 sleep 0.5
50 next i
60 goto 20
```

The border cycles forever, and the host loop never misses a frame,
because line 40 never actually sleeps: the scheduler simply declines
to run line 50 until the deadline has passed.
*/
