use num_bigint::BigInt;
use scalc::{run, Error, Printed};

fn ints(vals: &[i64]) -> Vec<Printed> {
    vals.iter().map(|&i| Printed::Int(BigInt::from(i))).collect()
}

fn big(digits: &str) -> Printed {
    Printed::Int(digits.parse().expect("bad test integer"))
}

fn assert_output(src: &str, expected: Vec<Printed>) {
    match run(src) {
        Ok(output) => assert_eq!(output, expected, "program:\n{}", src),
        Err(e) => panic!("program failed:\n{}\nError: {}", src, e),
    }
}

fn assert_syntax_error(src: &str) {
    match run(src) {
        Err(e) => assert!(e.is_syntax(), "expected syntax error, got {:?} for:\n{}", e, src),
        Ok(output) => panic!("expected syntax error, got {:?} for:\n{}", output, src),
    }
}

fn assert_undefined_name(src: &str, name: &str) {
    assert_eq!(
        run(src),
        Err(Error::UndefinedName {
            name: name.to_string()
        }),
        "program:\n{}",
        src
    );
}

#[test]
fn arithmetic_programs() {
    assert_output(
        "
        x = 1 + 1;
        y = x + x;
        z = y ^ 2;
        print(z);
        ",
        ints(&[16]),
    );
    assert_output(
        "x = 1 + 2 * 10; y = (1+2) * 10; print(x); print(y);",
        ints(&[21, 30]),
    );
    assert_output(
        "
        x = 2 - 3 - 4;
        y = 2 - (3 - 4);
        print(x);
        print(y);
        ",
        ints(&[-5, 3]),
    );
}

#[test]
fn operator_precedence() {
    assert_output(
        "
        a = 1;
        print(a);
        b = 5 - (a + 2);
        print(b);
        c = 20 / (4 * b);
        print(c);
        d = c ^ 2 ^ 2;
        print(d);
        e = c + b * d ^ 0.25;
        print(e);
        f = 1.5 + (a + b) ^ 2 - e / 2.5 * 1.5;
        print(f);
        ",
        vec![
            Printed::Int(1.into()),
            Printed::Int(2.into()),
            Printed::Float(2.5),
            Printed::Float(39.0625),
            Printed::Float(7.5),
            Printed::Int(6.into()),
        ],
    );
}

#[test]
fn right_associative_power() {
    assert_output("x = 2^3^2; print(x);", ints(&[512]));
    assert_output("x = (2^3)^2; print(x);", ints(&[64]));
}

#[test]
fn true_division() {
    assert_output("x = 5/2; print(x);", vec![Printed::Float(2.5)]);
    assert_output("x = 4/2; print(x);", ints(&[2]));
    assert_output("x = 1/3*3; print(x);", ints(&[1]));
}

#[test]
fn printed_rendering() {
    let output = run("x = 5/2; y = 4/2; print(x); print(y);").expect("program failed");
    let rendered: Vec<String> = output.iter().map(|v| v.to_string()).collect();
    assert_eq!(rendered, vec!["2.5", "2"]);
}

#[test]
fn big_integers() {
    assert_output(
        "x = 3 ^ 100; print(x);",
        vec![big("515377520732011331036461129765621272702107522001")],
    );
    assert_output(
        "x = 170141183460469231731687303715884105727 + 1; print(x);",
        vec![big("170141183460469231731687303715884105728")],
    );
    assert_output(
        "x = 10 ^ 300 * 10 ^ 10; print(x);",
        vec![big(&format!("1{}", "0".repeat(310)))],
    );

    let output = run("x = 2 ^ 200 - 2 ^ 200 + 1; print(x);").expect("program failed");
    assert_eq!(output[0].to_string(), "1");
}

#[test]
fn float_rendering_extremes() {
    let output = run("x = 1 / 10000000; y = 1.5 / 10000; print(x); print(y);")
        .expect("program failed");
    let rendered: Vec<String> = output.iter().map(|v| v.to_string()).collect();
    assert_eq!(rendered, vec!["1e-07", "0.00015"]);
}

#[test]
fn variable_scope() {
    assert_output(
        "
        a = 1; b = 2;
        print(a);
        print(b);
        {
            print(a);
            { print(b); }
            a = 3;
            { print(a); }
            print(a);
            {
                b = 4;
                print(b);
            }
            print(b);
        }
        print(a);
        print(b);
        ",
        ints(&[1, 2, 1, 2, 3, 3, 4, 2, 1, 2]),
    );
    assert_output(
        "a=1;b=2;print(a);print(b);{print(a);{print(b);}a=3;{print(a);}print(a);{b=4;print(b);}print(b);}print(a);print(b);",
        ints(&[1, 2, 1, 2, 3, 3, 4, 2, 1, 2]),
    );
}

#[test]
fn mixed() {
    assert_output(
        "
        printed = 123;
        print(printed);
        a = 3; b = 2; c = 3;
        {
            a = b;
            print(a);
        }
        print(a);
        ",
        ints(&[123, 2, 3]),
    );
}

#[test]
fn empty_programs() {
    assert_output("", vec![]);
    assert_output("{ }", vec![]);
    assert_output("{{}{{}}}", vec![]);
}

#[test]
fn syntax_errors() {
    let programs = vec![
        "x = 1 ++ 1;",
        "5 = 1 + 2 * 10;",
        "x = 2 - 3 - 4;\ny = 2 - (3 - 4)",
        "print = 1;",
        "a = (1 + 2;",
        "{\n    { a = 1;\n}",
        "a = 2 ** 2;",
        "a += 1;",
        "x = 1.;",
        "x = 2.0;",
        "x = 012;",
        "x = 1 $ 2;",
        "}",
        "x = -1;",
    ];

    for src in programs {
        assert_syntax_error(src);
    }
}

#[test]
fn syntax_error_location() {
    let err = run("a = 1;\nb = 2;\nc = 3 * * 4;").unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.to_string(), "syntax error on line 3: unexpected '*'");
}

#[test]
fn deep_nesting() {
    // Too deep for the recursive parser, reported instead of crashing
    for n in &[300, 1000, 100_000] {
        let src = format!("x = {}1{};", "(".repeat(*n), ")".repeat(*n));
        assert_syntax_error(&src);
    }
    let blocks = format!("{}{}", "{".repeat(1000), "}".repeat(1000));
    assert_syntax_error(&blocks);
    assert_syntax_error(&format!("x = 1{};", "^1".repeat(1000)));

    let err = run(&format!("a = 1;\nx = {}1{};", "(".repeat(500), ")".repeat(500))).unwrap_err();
    assert_eq!(err.line(), Some(2));

    let src = format!("x = {}1{}; print(x);", "(".repeat(150), ")".repeat(150));
    assert_output(&src, ints(&[1]));
    let src = format!("{}x = 5; print(x);{}", "{".repeat(150), "}".repeat(150));
    assert_output(&src, ints(&[5]));
}

#[test]
fn long_operator_chains() {
    let src = format!("x = 1{}; print(x);", " + 1".repeat(50_000));
    assert_output(&src, ints(&[50_001]));
    let src = format!("x = 100{}; print(x);", " - 1".repeat(50_000));
    assert_output(&src, ints(&[-49_900]));
}

#[test]
fn undefined_names() {
    assert_undefined_name("x = 1 + z;", "z");
    assert_undefined_name("{\n  x = 12 + 6;\n}\nz = x + x;", "x");
    assert_undefined_name(
        "
        x = 62 + 78;
        {
           z = x + 1;
           {
             y = z + x;
           }
           w = y;
        }
        ",
        "y",
    );
    assert_undefined_name("a = b;", "b");
    assert_undefined_name("{ b = 1; }\na = b;", "b");
    assert_undefined_name("a = 1;\nc = a + b;", "b");
    assert_undefined_name("{{{{{ a = b; }}}}}", "b");
    assert_undefined_name("print(q);", "q");
    assert_undefined_name("a = b; b = 1;", "b");
}

#[test]
fn arithmetic_errors() {
    for src in &["x = 1 / 0;", "x = 0 ^ (0 - 1);", "x = (0 - 8) ^ 0.5;"] {
        match run(src) {
            Err(Error::Arithmetic { .. }) => (),
            other => panic!("expected arithmetic error, got {:?} for {}", other, src),
        }
    }
}

#[test]
fn independent_runs() {
    assert_output("x = 1; print(x);", ints(&[1]));
    assert_undefined_name("print(x);", "x");
}
