//! Round-trip tests: reprinting a parsed module must preserve its shape.

use ponyfront_parser::parse_module;
use ponyfront_printer::to_pretty_source;
use ponyfront_tests::assert_round_trip;

#[test]
fn test_hello_world() {
    assert_round_trip(concat!(
        "\"\"\"A minimal program.\"\"\"\n",
        "use \"collections\"\n",
        "\n",
        "actor Main\n",
        "  new create(env: Env) =>\n",
        "    env.out.print(\"Hello, world!\")\n",
    ));
}

#[test]
fn test_class_with_fields_and_generics() {
    assert_round_trip(concat!(
        "class \\packed\\ ref Registry[A: Comparable[A] #read, B = String] is Seq[A]\n",
        "  \"\"\"Keeps things.\"\"\"\n",
        "  var _items: Array[A] = Array[A]\n",
        "  let _name: String\n",
        "  embed _log: Log\n",
        "\n",
        "  new create(name': String = \"registry\") =>\n",
        "    _name = name'\n",
        "\n",
        "  fun size(): USize =>\n",
        "    _items.size()\n",
    ));
}

#[test]
fn test_interface_and_trait_members() {
    assert_round_trip(concat!(
        "interface tag Receiver\n",
        "  be receive(token: U64)\n",
        "\n",
        "trait Named\n",
        "  fun name(): String\n",
        "  fun greeting(): String =>\n",
        "    \"hello \" + name()\n",
        "\n",
        "primitive Platform\n",
        "  fun @runtime_override(): U32 =>\n",
        "    1\n",
    ));
}

#[test]
fn test_operator_chains() {
    assert_round_trip(concat!(
        "primitive Ops\n",
        "  fun apply(a: U32, b: U32): U32 =>\n",
        "    a + b * 2 - 1\n",
        "  fun partial_ops(a: U32, b: U32): U32 ? =>\n",
        "    (a +? b) /? 2\n",
        "  fun unchecked(a: U32, b: U32): U32 =>\n",
        "    (a +~ b) <<~ 1\n",
        "  fun logic(a: Bool, b: Bool): Bool =>\n",
        "    (not a) and b or (a xor b)\n",
        "  fun identity(a: Any, b: Any): Bool =>\n",
        "    (a is b) or (a isnt b)\n",
        "  fun cast(a: Any val): U32 ? =>\n",
        "    a as U32\n",
        "  fun negate(a: I32): I32 =>\n",
        "    -a - -1\n",
        "  fun hashes(a: Any): U64 =>\n",
        "    digestof a\n",
    ));
}

#[test]
fn test_postfix_suffixes() {
    assert_round_trip(concat!(
        "actor Caller\n",
        "  be call_things(m: Map[String, U32]) =>\n",
        "    m.update(\"k\", 1)\n",
        "    m~apply(\"k\")\n",
        "    m.>clear().>compact()\n",
        "    Map[String, U32].create()\n",
        "    m.fetch(\"k\", 0 where strict = true, log = false)\n",
        "    m.remove(\"k\")?\n",
    ));
}

#[test]
fn test_control_flow() {
    assert_round_trip(concat!(
        "primitive Flow\n",
        "  fun branch(x: U32): U32 =>\n",
        "    if x > 10 then\n",
        "      1\n",
        "    elseif x > 5 then\n",
        "      2\n",
        "    elseif x > 1 then\n",
        "      3\n",
        "    else\n",
        "      0\n",
        "    end\n",
        "  fun loop_while(n: U32): U32 =>\n",
        "    var i: U32 = 0\n",
        "    while i < n do\n",
        "      i = i + 1\n",
        "    else\n",
        "      0\n",
        "    end\n",
        "    i\n",
        "  fun loop_repeat(n: U32): U32 =>\n",
        "    var i: U32 = 0\n",
        "    repeat\n",
        "      i = i + 1\n",
        "    until i >= n\n",
        "    end\n",
        "    i\n",
        "  fun loop_for(xs: Array[U32]): U32 =>\n",
        "    var total: U32 = 0\n",
        "    for (idx, x) in xs.pairs() do\n",
        "      total = total + x\n",
        "    end\n",
        "    total\n",
        "  fun risky(): U32 =>\n",
        "    try\n",
        "      fallible()?\n",
        "    else\n",
        "      0\n",
        "    then\n",
        "      cleanup()\n",
        "    end\n",
    ));
}

#[test]
fn test_match_expression() {
    assert_round_trip(concat!(
        "primitive Classify\n",
        "  fun apply(x: (U32 | String | None)): String =>\n",
        "    match x\n",
        "    | 0 => \"zero\"\n",
        "    | let n: U32 if n > 100 => \"big\"\n",
        "    | let n: U32 => \"small\"\n",
        "    | let s: String => s\n",
        "    | None => \"none\"\n",
        "    else\n",
        "      \"unreachable\"\n",
        "    end\n",
    ));
}

#[test]
fn test_compile_time_conditionals() {
    assert_round_trip(concat!(
        "primitive Build\n",
        "  fun target(): String =>\n",
        "    ifdef windows then\n",
        "      \"windows\"\n",
        "    elseif linux and x86 then\n",
        "      \"linux\"\n",
        "    else\n",
        "      \"other\"\n",
        "    end\n",
        "  fun widen[A](x: A): U64 =>\n",
        "    iftype A <: U8 then\n",
        "      1\n",
        "    elseif A <: (U16 | U32) then\n",
        "      2\n",
        "    else\n",
        "      8\n",
        "    end\n",
    ));
}

#[test]
fn test_with_recover_consume() {
    assert_round_trip(concat!(
        "actor Resources\n",
        "  be run(path: String) =>\n",
        "    with file = open(path), lock = acquire() do\n",
        "      file.read_all()\n",
        "    end\n",
        "    let s: String iso = recover iso\n",
        "      String\n",
        "    end\n",
        "    send(consume s)\n",
        "    let t: String val = recover val\n",
        "      String\n",
        "    end\n",
        "    keep(consume val t)\n",
    ));
}

#[test]
fn test_literals() {
    assert_round_trip(concat!(
        "primitive Literals\n",
        "  fun ints(): U64 =>\n",
        "    0xFF_EC + 0b1010 + 1_000_000 + 'A'\n",
        "  fun floats(): F64 =>\n",
        "    3.14 + 1e10 + 2.5e-3\n",
        "  fun strings(): String =>\n",
        "    \"with \\\"escapes\\\" and \\n\\x41\\u00E9\"\n",
        "  fun doc(): String =>\n",
        "    \"\"\"\n",
        "    Triple-quoted, kept verbatim.\n",
        "    \"\"\"\n",
        "  fun flags(): (Bool, Bool) =>\n",
        "    (true, false)\n",
        "  fun me(): Literals =>\n",
        "    this\n",
    ));
}

#[test]
fn test_collections_and_objects() {
    assert_round_trip(concat!(
        "actor Builders\n",
        "  be build(env: Env) =>\n",
        "    let pair = (1, \"one\")\n",
        "    let empty: Array[U8] = []\n",
        "    let bytes = [as U8: 1; 2; 3]\n",
        "    let mixed = [\n",
        "      \"a\"\n",
        "      \"b\"\n",
        "    ]\n",
        "    let notify = object iso is Notify\n",
        "      let _env: Env = env\n",
        "      fun ref apply() =>\n",
        "        _env.out.print(\"fired\")\n",
        "    end\n",
        "    consume notify\n",
    ));
}

#[test]
fn test_ffi() {
    assert_round_trip(concat!(
        "use @printf[I32](fmt: Pointer[U8] tag, ...)\n",
        "use @pony_exitcode[None](code: I32) if posix\n",
        "\n",
        "primitive Exit\n",
        "  fun apply(code: I32) =>\n",
        "    @pony_exitcode(code)\n",
        "    @printf(\"done\\n\".cstring())\n",
    ));
}

#[test]
fn test_use_directives() {
    assert_round_trip(concat!(
        "use \"collections\"\n",
        "use buf = \"buffered\"\n",
        "use win = \"winsock\" if windows\n",
        "\n",
        "actor Main\n",
        "  new create(env: Env) =>\n",
        "    None\n",
    ));
}

#[test]
fn test_newline_sensitive_sequences() {
    // Elements starting with `(`, `[`, and `-` only stay separate
    // expressions when a newline precedes them.
    assert_round_trip(concat!(
        "primitive Seqs\n",
        "  fun apply(foo: Thing, x: I32): I32 =>\n",
        "    foo\n",
        "    (1, 2)\n",
        "    [as U8: 9]\n",
        "    -x\n",
    ));
}

#[test]
fn test_types() {
    assert_round_trip(concat!(
        "class Typed\n",
        "  var a: (U32 | String | None)\n",
        "  var b: (Hashable box & Stringable box)\n",
        "  var c: (U32, (String, Bool))\n",
        "  var d: this->Map[String, U32]\n",
        "  var e: Origin->Middle->Target\n",
        "  var f: String iso^\n",
        "  var g: String ref!\n",
        "  var h: Pointer[U8] tag\n",
        "\n",
        "  fun constrained[A: Comparable[A], B: Any #share](x: A, y: B) =>\n",
        "    None\n",
    ));
}

#[test]
fn test_jumps() {
    assert_round_trip(concat!(
        "primitive Jumps\n",
        "  fun early(x: U32): U32 =>\n",
        "    if x == 0 then\n",
        "      return 99\n",
        "    end\n",
        "    x\n",
        "  fun scan(xs: Array[U32]): U32 =>\n",
        "    for x in xs.values() do\n",
        "      if x == 0 then\n",
        "        continue\n",
        "      end\n",
        "      if x > 100 then\n",
        "        break x\n",
        "      end\n",
        "    end\n",
        "    0\n",
        "  fun fail(): U32 ? =>\n",
        "    error\n",
        "  fun unsupported(): U32 =>\n",
        "    compile_error \"not supported\"\n",
    ));
}

#[test]
fn test_jump_values_starting_on_a_new_line() {
    // The compact rendition puts these values on the jump keyword's line,
    // where the plain `(`, `[` and `-` kinds must still open the value.
    assert_round_trip(concat!(
        "primitive JumpValues\n",
        "  fun pair(): (U32, U32) =>\n",
        "    return\n",
        "    (1, 2)\n",
        "  fun negative(): I32 =>\n",
        "    return\n",
        "    -1\n",
        "  fun bytes(): Array[U8] =>\n",
        "    return\n",
        "    [as U8: 1; 2]\n",
    ));
}

#[test]
fn test_annotations() {
    assert_round_trip(concat!(
        "class \\nodoc\\ Annotated\n",
        "  fun \\likely\\ hot(x: Bool): U32 =>\n",
        "    if \\likely\\ x then\n",
        "      1\n",
        "    else\n",
        "      0\n",
        "    end\n",
    ));
}

#[test]
fn test_pretty_print_is_stable() {
    // Pretty output reparses to an equal tree, so printing again must
    // reproduce it byte for byte.
    let source = concat!(
        "use \"collections\"\n",
        "\n",
        "actor Main\n",
        "  new create(env: Env) =>\n",
        "    for i in Range(0, 10) do\n",
        "      env.out.print(i.string())\n",
        "    end\n",
    );
    let first = to_pretty_source(&parse_module(source).expect("parses"));
    let second = to_pretty_source(&parse_module(&first).expect("pretty output reparses"));
    assert_eq!(first, second);
}
