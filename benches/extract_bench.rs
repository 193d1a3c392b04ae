use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use schema_mapper::parser::{Parser, StatementType, STMT_BUFFER_SIZE};
use schema_mapper::resolver::resolve;
use schema_mapper::schema::extract_from_sql;
use std::hint::black_box;

fn generate_schema_sql(tables: usize, columns_per_table: usize) -> Vec<u8> {
    let mut data = Vec::new();

    data.extend_from_slice(b"CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255));\n");

    for t in 0..tables {
        let mut stmt = format!("CREATE TABLE table_{} (id INT PRIMARY KEY", t);
        for c in 0..columns_per_table {
            stmt.push_str(&format!(", col_{} VARCHAR(255)", c));
        }
        stmt.push_str(", user_id INT, FOREIGN KEY (user_id) REFERENCES users (id));\n");
        data.extend_from_slice(stmt.as_bytes());
    }

    data
}

fn bench_statement_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_reading");

    for tables in [100, 1000, 5000] {
        let data = generate_schema_sql(tables, 10);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("read_statement", format!("{}_tables", tables)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut parser = Parser::new(&data[..], STMT_BUFFER_SIZE);
                    let mut count = 0;
                    while let Ok(Some(_stmt)) = parser.read_statement() {
                        count += 1;
                    }
                    black_box(count)
                })
            },
        );
    }

    group.finish();
}

fn bench_statement_classification(c: &mut Criterion) {
    let stmts: Vec<&[u8]> = vec![
        b"CREATE TABLE users (id INT PRIMARY KEY);",
        b"CREATE TABLE IF NOT EXISTS `posts` (id INT);",
        b"CREATE INDEX idx_users_email ON users (email);",
        b"ALTER TABLE users ADD COLUMN status INT;",
        b"INSERT INTO users VALUES (1, 'test');",
    ];

    c.bench_function("parse_statement_mixed", |b| {
        b.iter(|| {
            for stmt in &stmts {
                let result = Parser::<&[u8]>::parse_statement(black_box(stmt));
                black_box(result);
            }
        })
    });
}

fn bench_schema_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_extraction");

    for tables in [50, 500, 2000] {
        let data = generate_schema_sql(tables, 10);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("extract_from_sql", format!("{}_tables", tables)),
            &data,
            |b, data| {
                b.iter(|| {
                    let (schema, warnings) = extract_from_sql(&data[..]).unwrap();
                    black_box((schema.len(), warnings.len()))
                })
            },
        );
    }

    group.finish();
}

fn bench_relationship_resolution(c: &mut Criterion) {
    let data = generate_schema_sql(500, 10);
    let (schema, _) = extract_from_sql(&data[..]).unwrap();

    let mut group = c.benchmark_group("relationship_resolution");

    group.bench_function("explicit_only", |b| {
        b.iter(|| black_box(resolve(&schema, false).len()))
    });

    group.bench_function("with_inference", |b| {
        b.iter(|| black_box(resolve(&schema, true).len()))
    });

    group.finish();
}

fn bench_statement_types(c: &mut Criterion) {
    let data = generate_schema_sql(200, 10);

    c.bench_function("classify_stream", |b| {
        b.iter(|| {
            let mut parser = Parser::new(&data[..], STMT_BUFFER_SIZE);
            let mut creates = 0;
            while let Ok(Some(stmt)) = parser.read_statement() {
                let (stmt_type, _table) = Parser::<&[u8]>::parse_statement(&stmt);
                if stmt_type == StatementType::CreateTable {
                    creates += 1;
                }
            }
            black_box(creates)
        })
    });
}

criterion_group!(
    benches,
    bench_statement_reading,
    bench_statement_classification,
    bench_schema_extraction,
    bench_relationship_resolution,
    bench_statement_types,
);

criterion_main!(benches);
