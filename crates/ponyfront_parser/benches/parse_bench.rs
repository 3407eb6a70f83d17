use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ponyfront_parser::parse_module;

// A medium-size Pony source (~80 lines) with various constructs
const PONY_SOURCE: &str = r#""""
A ring of actors passing a token around until it has made enough laps.
"""
use "collections"
use "time"
use @exit[None](status: I32)

interface tag Receiver
  be receive(token: U64)

actor Ring is Receiver
  let _id: U32
  let _env: Env
  var _next: (Ring | None) = None

  new create(id: U32, env: Env) =>
    _id = id
    _env = env

  be set_next(next: Ring) =>
    _next = next

  be receive(token: U64) =>
    if token > 0 then
      match _next
      | let next: Ring => next.receive(token - 1)
      | None => _env.out.print("ring broken at " + _id.string())
      end
    else
      _env.out.print("done at " + _id.string())
    end

class val Config
  let size: U32
  let laps: U64

  new val create(size': U32 = 3, laps': U64 = 100) =>
    size = size'
    laps = laps'

  fun tokens(): U64 =>
    size.u64() * laps

primitive Parse
  fun config(args: Array[String] val): Config ? =>
    var size: U32 = 3
    var laps: U64 = 100
    for arg in args.values() do
      if arg.at("--size") then
        size = arg.substring(7).u32()?
      elseif arg.at("--laps") then
        laps = arg.substring(7).u64()?
      end
    end
    Config(size, laps)

actor Main
  new create(env: Env) =>
    let config =
      try
        Parse.config(env.args)?
      else
        Config
      end
    let first = Ring(0, env)
    var prev = first
    var i: U32 = 1
    while i < config.size do
      let ring = Ring(i, env)
      ring.set_next(prev)
      prev = ring
      i = i + 1
    end
    first.set_next(prev)
    first.receive(config.tokens())
"#;

fn bench_parse_pony(c: &mut Criterion) {
    c.bench_function("parse_pony_medium", |b| {
        b.iter(|| {
            let module = parse_module(black_box(PONY_SOURCE));
            black_box(module).unwrap()
        });
    });
}

criterion_group!(benches, bench_parse_pony);
criterion_main!(benches);
